use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait defining the contract for exchange-rate lookup.
///
/// Returns the rate in direct notation (term units per base unit) for the
/// given date, or `None` when no series exists for the pair - callers treat
/// absence as the identity rate. Lookups are synchronous and side-effect
/// free.
pub trait RateProviderTrait: Send + Sync {
    fn lookup_rate(&self, base: &str, term: &str, date: NaiveDate) -> Option<Decimal>;
}
