use rust_decimal::Decimal;

use crate::constants::{AMOUNT_EPSILON, QUOTE_EPSILON, RATE_TOLERANCE};
use crate::money::{Amount, QuotePrice, ShareQuantity};

/// Whether `term_amount ~= base_amount * rate`.
///
/// The tolerance is the rate tolerance scaled by the base amount, but never
/// tighter than one minor unit - the converted side is itself rounded to the
/// amount scale.
pub fn conversion_consistent(base_amount: Amount, rate: Decimal, term_amount: Amount) -> bool {
    if base_amount.is_zero() {
        return term_amount.is_zero();
    }
    let expected = base_amount.to_decimal() * rate;
    let tolerance = (base_amount.to_decimal().abs() * RATE_TOLERANCE).max(AMOUNT_EPSILON);
    (term_amount.to_decimal() - expected).abs() <= tolerance
}

/// Whether `lump_sum ~= shares * quote`.
///
/// An error of one unit in the last place of the quote grows by the share
/// count, so the tolerance scales with shares; one minor unit absorbs the
/// rounding of the lump sum itself. Nothing to check while shares are zero.
pub fn quote_consistent(shares: ShareQuantity, quote: QuotePrice, lump_sum: Amount) -> bool {
    if shares.is_zero() {
        return true;
    }
    let expected = shares.to_decimal() * quote.to_decimal();
    let tolerance = (shares.to_decimal().abs() * QUOTE_EPSILON).max(AMOUNT_EPSILON);
    (lump_sum.to_decimal() - expected).abs() <= tolerance
}
