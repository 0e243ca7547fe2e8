use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::fx::RateProviderTrait;
use crate::money::ExchangeRate;

/// A provider with no rate series at all; every lookup is absent.
#[derive(Clone, Default)]
pub struct NoRatesProvider;

impl RateProviderTrait for NoRatesProvider {
    fn lookup_rate(&self, _base: &str, _term: &str, _date: NaiveDate) -> Option<Decimal> {
        None
    }
}

/// An in-memory rate table keyed by currency pair and date.
///
/// A lookup answers with the most recent rate on or before the requested
/// date. Pairs stored in one direction also answer for the opposite
/// direction through the reciprocal, rounded to the rate scale.
#[derive(Clone, Default)]
pub struct StaticRateProvider {
    series: HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>,
}

impl StaticRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, base: &str, term: &str, date: NaiveDate, rate: Decimal) {
        if rate <= Decimal::ZERO {
            log::error!("ignoring non-positive rate {} for {}/{}", rate, base, term);
            return;
        }
        self.series
            .entry((base.to_string(), term.to_string()))
            .or_default()
            .insert(date, rate);
    }

    fn latest_on_or_before(&self, base: &str, term: &str, date: NaiveDate) -> Option<Decimal> {
        self.series
            .get(&(base.to_string(), term.to_string()))
            .and_then(|by_date| by_date.range(..=date).next_back())
            .map(|(_, rate)| *rate)
    }
}

impl RateProviderTrait for StaticRateProvider {
    fn lookup_rate(&self, base: &str, term: &str, date: NaiveDate) -> Option<Decimal> {
        if base == term {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.latest_on_or_before(base, term, date) {
            return Some(rate);
        }
        self.latest_on_or_before(term, base, date).and_then(|rate| {
            ExchangeRate::new(term, base, rate)
                .and_then(|direct| direct.inverse())
                .map(|inverse| inverse.rate())
                .ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_provider() -> StaticRateProvider {
        let mut provider = StaticRateProvider::new();
        provider.insert("USD", "EUR", date(2024, 3, 10), dec!(0.88));
        provider.insert("USD", "EUR", date(2024, 3, 15), dec!(0.90));
        provider
    }

    #[test]
    fn test_exact_date_lookup() {
        let provider = test_provider();
        assert_eq!(
            provider.lookup_rate("USD", "EUR", date(2024, 3, 15)),
            Some(dec!(0.90))
        );
    }

    #[test]
    fn test_falls_back_to_most_recent_earlier_date() {
        let provider = test_provider();
        assert_eq!(
            provider.lookup_rate("USD", "EUR", date(2024, 3, 12)),
            Some(dec!(0.88))
        );
        assert_eq!(provider.lookup_rate("USD", "EUR", date(2024, 3, 1)), None);
    }

    #[test]
    fn test_inverse_direction_answers_with_reciprocal() {
        let provider = test_provider();
        let rate = provider.lookup_rate("EUR", "USD", date(2024, 3, 15)).unwrap();
        assert_eq!(rate, dec!(1.1111111111));
    }

    #[test]
    fn test_same_currency_is_identity() {
        let provider = StaticRateProvider::new();
        assert_eq!(
            provider.lookup_rate("EUR", "EUR", date(2024, 3, 15)),
            Some(Decimal::ONE)
        );
    }

    #[test]
    fn test_no_series_is_absent() {
        let provider = NoRatesProvider;
        assert_eq!(provider.lookup_rate("USD", "EUR", date(2024, 3, 15)), None);
    }
}
