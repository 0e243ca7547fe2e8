//! Holdings-snapshot boundary.
//!
//! A read-only view onto "how much of this security was held where, when",
//! used only to pre-fill shares and values for disposals and transfers.

mod holdings_model;
mod holdings_traits;

pub use holdings_model::{HoldingsScope, PositionSnapshot};
pub use holdings_traits::{EmptyHoldingsView, HoldingsViewTrait, StaticHoldingsView};
