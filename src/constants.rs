use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal digits of a monetary amount (minor units).
pub const AMOUNT_SCALE: u32 = 2;

/// Multiplier between a monetary amount and its minor-unit representation.
pub const AMOUNT_FACTOR: i64 = 100;

/// Decimal digits of a share quantity.
pub const SHARE_SCALE: u32 = 3;

/// Multiplier between a share quantity and its fixed-point representation.
pub const SHARE_FACTOR: i64 = 1_000;

/// Decimal digits of a price quote.
pub const QUOTE_SCALE: u32 = 4;

/// Multiplier between a quote and its fixed-point representation.
pub const QUOTE_FACTOR: i64 = 10_000;

/// Decimal digits an exchange rate (and its inverse) is carried at.
pub const RATE_SCALE: u32 = 10;

/// Permitted deviation between an entered exchange rate and the effective
/// rate implied by the entered amounts.
pub const RATE_TOLERANCE: Decimal = dec!(0.0001);

/// One unit in the last place of a quote, as a decimal fraction.
pub const QUOTE_EPSILON: Decimal = dec!(0.0001);

/// One minor unit of a monetary amount, as a decimal fraction.
pub const AMOUNT_EPSILON: Decimal = dec!(0.01);
