//! Exchange-rate lookup boundary.
//!
//! The editing models only ever ask "what was the rate for this pair on
//! this date"; where rates come from is the host's business. The absence of
//! a rate series means the identity rate.

mod fx_providers;
mod fx_traits;

pub use fx_providers::{NoRatesProvider, StaticRateProvider};
pub use fx_traits::RateProviderTrait;
