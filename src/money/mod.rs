//! Fixed-point monetary value types.
//!
//! Amounts, share quantities and price quotes are `i64` fixed-point values
//! at distinct scales, so the type system prevents mixing them without an
//! explicit decimal conversion. Exchange rates are arbitrary-precision
//! decimals in direct (term per base) notation.

mod money_errors;
mod money_model;


pub use money_errors::MoneyError;
pub use money_model::{Amount, ExchangeRate, MonetaryAmount, QuotePrice, ShareQuantity};
