use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::{
    AMOUNT_FACTOR, AMOUNT_SCALE, QUOTE_FACTOR, QUOTE_SCALE, RATE_SCALE, SHARE_FACTOR, SHARE_SCALE,
};
use crate::money::MoneyError;

fn fixed_from_decimal(value: Decimal, scale: u32, factor: i64) -> Option<i64> {
    let rounded = value.round_dp(scale);
    (rounded * Decimal::from(factor)).to_i64()
}

/// A currency-less monetary amount in minor units (scale 2).
///
/// Editing models work with bare amounts and derive the currency from the
/// current account/portfolio selection; [`MonetaryAmount`] attaches the
/// currency code when a value crosses into the persisted representation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn new(minor_units: i64) -> Self {
        Amount(minor_units)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, AMOUNT_SCALE)
    }

    /// Converts a decimal into minor units, rounding to the amount scale
    /// (banker's rounding).
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        fixed_from_decimal(value, AMOUNT_SCALE, AMOUNT_FACTOR)
            .map(Amount)
            .ok_or_else(|| MoneyError::Overflow(value.to_string()))
    }

    /// Like [`Amount::from_decimal`] but clamps at the representable bounds
    /// instead of failing. Used inside the editing fan-out, where a setter
    /// has no error channel; out-of-range input is logged and clamped.
    pub fn from_decimal_lossy(value: Decimal) -> Self {
        match fixed_from_decimal(value, AMOUNT_SCALE, AMOUNT_FACTOR) {
            Some(units) => Amount(units),
            None => {
                log::warn!("amount {} exceeds the representable range, clamping", value);
                if value.is_sign_negative() {
                    Amount(i64::MIN)
                } else {
                    Amount(i64::MAX)
                }
            }
        }
    }

    pub fn saturating_add(&self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Subtraction floored at zero, the disposal-side total rule.
    pub fn sub_or_zero(&self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0).max(0))
    }
}

/// A share quantity with three implied decimal digits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShareQuantity(i64);

impl ShareQuantity {
    pub const ZERO: ShareQuantity = ShareQuantity(0);

    pub fn new(raw: i64) -> Self {
        ShareQuantity(raw)
    }

    /// Whole share count scaled into the fixed-point representation.
    pub fn from_whole(shares: i64) -> Self {
        ShareQuantity(shares.saturating_mul(SHARE_FACTOR))
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, SHARE_SCALE)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        fixed_from_decimal(value, SHARE_SCALE, SHARE_FACTOR)
            .map(ShareQuantity)
            .ok_or_else(|| MoneyError::Overflow(value.to_string()))
    }

    pub fn from_decimal_lossy(value: Decimal) -> Self {
        match fixed_from_decimal(value, SHARE_SCALE, SHARE_FACTOR) {
            Some(raw) => ShareQuantity(raw),
            None => {
                log::warn!("share quantity {} exceeds the representable range, clamping", value);
                ShareQuantity(i64::MAX)
            }
        }
    }
}

/// A price per share with four implied decimal digits.
///
/// Denominated in the security's own currency; a quote is never directly
/// comparable to an [`Amount`] or a [`ShareQuantity`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuotePrice(i64);

impl QuotePrice {
    pub const ZERO: QuotePrice = QuotePrice(0);

    pub fn new(raw: i64) -> Self {
        QuotePrice(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, QUOTE_SCALE)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        fixed_from_decimal(value, QUOTE_SCALE, QUOTE_FACTOR)
            .map(QuotePrice)
            .ok_or_else(|| MoneyError::Overflow(value.to_string()))
    }

    pub fn from_decimal_lossy(value: Decimal) -> Self {
        match fixed_from_decimal(value, QUOTE_SCALE, QUOTE_FACTOR) {
            Some(raw) => QuotePrice(raw),
            None => {
                log::warn!("quote {} exceeds the representable range, clamping", value);
                QuotePrice(i64::MAX)
            }
        }
    }
}

/// A currency-labelled monetary amount, the persisted form of [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryAmount {
    currency: String,
    value: Amount,
}

impl MonetaryAmount {
    pub fn new(currency: impl Into<String>, value: Amount) -> Self {
        MonetaryAmount {
            currency: currency.into(),
            value,
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        MonetaryAmount::new(currency, Amount::ZERO)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn to_decimal(&self) -> Decimal {
        self.value.to_decimal()
    }

    pub fn checked_add(&self, other: &MonetaryAmount) -> Result<MonetaryAmount, MoneyError> {
        self.expect_currency(other)?;
        self.value
            .0
            .checked_add(other.value.0)
            .map(|units| MonetaryAmount::new(self.currency.clone(), Amount(units)))
            .ok_or_else(|| MoneyError::Overflow(format!("{} + {}", self.value.0, other.value.0)))
    }

    pub fn checked_sub(&self, other: &MonetaryAmount) -> Result<MonetaryAmount, MoneyError> {
        self.expect_currency(other)?;
        self.value
            .0
            .checked_sub(other.value.0)
            .map(|units| MonetaryAmount::new(self.currency.clone(), Amount(units)))
            .ok_or_else(|| MoneyError::Overflow(format!("{} - {}", self.value.0, other.value.0)))
    }

    fn expect_currency(&self, other: &MonetaryAmount) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.currency.clone(),
                actual: other.currency.clone(),
            });
        }
        Ok(())
    }
}

/// An exchange rate in direct notation: one unit of the base currency is
/// worth `rate` units of the term currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    base_currency: String,
    term_currency: String,
    #[serde(with = "crate::utils::decimal_serde::rate_serde")]
    rate: Decimal,
}

impl ExchangeRate {
    pub fn new(
        base_currency: impl Into<String>,
        term_currency: impl Into<String>,
        rate: Decimal,
    ) -> Result<Self, MoneyError> {
        if rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidRate(rate.to_string()));
        }
        Ok(ExchangeRate {
            base_currency: base_currency.into(),
            term_currency: term_currency.into(),
            rate,
        })
    }

    /// The identity rate for a same-currency pair.
    pub fn identity(currency: impl Into<String>) -> Self {
        let currency = currency.into();
        ExchangeRate {
            base_currency: currency.clone(),
            term_currency: currency,
            rate: Decimal::ONE,
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn term_currency(&self) -> &str {
        &self.term_currency
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn is_identity(&self) -> bool {
        self.base_currency == self.term_currency
    }

    /// The reciprocal rate, rounded half-down to `RATE_SCALE` digits.
    pub fn inverse(&self) -> Result<ExchangeRate, MoneyError> {
        if self.rate.is_zero() {
            return Err(MoneyError::InvalidRate("0".to_string()));
        }
        let inverted = (Decimal::ONE / self.rate)
            .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointTowardZero);
        Ok(ExchangeRate {
            base_currency: self.term_currency.clone(),
            term_currency: self.base_currency.clone(),
            rate: inverted,
        })
    }

    /// Converts a base-currency amount into the term currency, rounding to
    /// the amount scale.
    pub fn convert(&self, amount: &MonetaryAmount) -> Result<MonetaryAmount, MoneyError> {
        if amount.currency() != self.base_currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.base_currency.clone(),
                actual: amount.currency().to_string(),
            });
        }
        let converted = Amount::from_decimal(amount.to_decimal() * self.rate)?;
        Ok(MonetaryAmount::new(self.term_currency.clone(), converted))
    }
}
