use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::domain::{Security, SignPolicy};
use crate::editor::{EntryEventRegistry, EntryEventSink, EntryField};
use crate::fx::RateProviderTrait;
use crate::money::{Amount, QuotePrice, ShareQuantity};
use crate::validation::{
    conversion_consistent, quote_consistent, ValidationIssue, ValidationStatus,
};

/// Session defaults passed explicitly into every model constructor.
///
/// "Today" and the default time-of-day are configuration of the host, not
/// process-wide state.
#[derive(Clone, Debug)]
pub struct EntryDefaults {
    pub today: NaiveDate,
    pub time: NaiveTime,
}

impl EntryDefaults {
    pub fn new(today: NaiveDate, time: NaiveTime) -> Self {
        EntryDefaults { today, time }
    }

    pub fn entry_timestamp(&self) -> NaiveDateTime {
        self.today.and_time(self.time)
    }
}

/// The shared calculation core of the security-trading models.
///
/// Keeps `shares`, `quote`, `lump_sum`, `exchange_rate`,
/// `converted_lump_sum`, `fees`, `taxes` and `total` consistent under
/// single-field edits with a one-directional propagation discipline:
///
/// - `trigger_*` primitives set one field and republish it, cascading only
///   forward (lump sum -> converted lump sum -> total), never back-solving.
/// - `set_*` primitives - the user-facing mutators - additionally back-solve
///   exactly one sibling field when that resolution is unambiguous. Setting
///   shares while a quote is known recomputes the lump sum; setting shares
///   while only a lump sum is known recomputes the quote instead, never
///   both. This keeps the fan-out acyclic and terminating.
///
/// The wrapping variant owns selections beyond the security, feeds the
/// settlement currency in, and recomputes the validation status after every
/// public mutation.
pub struct SecurityEntryCalc {
    pub(crate) policy: SignPolicy,
    pub(crate) security: Option<Security>,
    pub(crate) settlement_currency: String,
    pub(crate) date: NaiveDateTime,
    pub(crate) shares: ShareQuantity,
    pub(crate) quote: QuotePrice,
    pub(crate) lump_sum: Amount,
    pub(crate) exchange_rate: Decimal,
    pub(crate) converted_lump_sum: Amount,
    pub(crate) fees: Amount,
    pub(crate) taxes: Amount,
    pub(crate) total: Amount,
    pub(crate) note: String,
    pub(crate) status: ValidationStatus,
    /// Zero totals pass validation only where the amount is explicitly
    /// optional (zero-value deliveries).
    pub(crate) allow_zero_total: bool,
    pub(crate) events: EntryEventRegistry,
    pub(crate) rates: Arc<dyn RateProviderTrait>,
}

impl SecurityEntryCalc {
    pub fn new(
        policy: SignPolicy,
        allow_zero_total: bool,
        defaults: &EntryDefaults,
        rates: Arc<dyn RateProviderTrait>,
    ) -> Self {
        SecurityEntryCalc {
            policy,
            security: None,
            settlement_currency: String::new(),
            date: defaults.entry_timestamp(),
            shares: ShareQuantity::ZERO,
            quote: QuotePrice::ZERO,
            lump_sum: Amount::ZERO,
            exchange_rate: Decimal::ONE,
            converted_lump_sum: Amount::ZERO,
            fees: Amount::ZERO,
            taxes: Amount::ZERO,
            total: Amount::ZERO,
            note: String::new(),
            status: ValidationStatus::Ok,
            allow_zero_total,
            events: EntryEventRegistry::new(),
            rates,
        }
    }

    pub fn register_sink(&mut self, sink: Arc<dyn EntryEventSink>) {
        self.events.register(sink);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn policy(&self) -> SignPolicy {
        self.policy
    }

    pub fn security(&self) -> Option<&Security> {
        self.security.as_ref()
    }

    /// The security's currency, empty while no security is selected.
    pub fn security_currency(&self) -> &str {
        self.security.as_ref().map(|s| s.currency.as_str()).unwrap_or("")
    }

    /// The settlement currency, empty while no account/portfolio is
    /// selected.
    pub fn settlement_currency(&self) -> &str {
        &self.settlement_currency
    }

    /// Whether the security trades in a currency other than the settlement
    /// currency. False while either selection is missing.
    pub fn is_cross_currency(&self) -> bool {
        !self.security_currency().is_empty()
            && !self.settlement_currency.is_empty()
            && self.security_currency() != self.settlement_currency
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn shares(&self) -> ShareQuantity {
        self.shares
    }

    pub fn quote(&self) -> QuotePrice {
        self.quote
    }

    pub fn lump_sum(&self) -> Amount {
        self.lump_sum
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn converted_lump_sum(&self) -> Amount {
        self.converted_lump_sum
    }

    pub fn fees(&self) -> Amount {
        self.fees
    }

    pub fn taxes(&self) -> Amount {
        self.taxes
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn status(&self) -> &ValidationStatus {
        &self.status
    }

    // ------------------------------------------------------------------
    // Selection mutators
    // ------------------------------------------------------------------

    pub fn set_security(&mut self, security: Option<Security>) {
        self.security = security;
        self.events.emit_field(EntryField::Security);
        self.events.emit_field(EntryField::SecurityCurrency);
        self.refresh_exchange_rate();
    }

    pub fn set_settlement_currency(&mut self, currency: &str) {
        self.settlement_currency = currency.to_string();
        self.events.emit_field(EntryField::TransactionCurrency);
        self.refresh_exchange_rate();
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.date = date;
        self.events.emit_field(EntryField::Date);
        self.refresh_exchange_rate();
    }

    /// Re-derives the exchange rate from the provider for the current
    /// currency pairing and date, then refreshes the converted side.
    /// Identity when the currencies match, a selection is missing, or no
    /// series exists.
    pub fn refresh_exchange_rate(&mut self) {
        let rate = if self.is_cross_currency() {
            let base = self.security_currency().to_string();
            let rate = self
                .rates
                .lookup_rate(&base, &self.settlement_currency, self.date.date())
                .unwrap_or(Decimal::ONE);
            log::debug!(
                "exchange rate {}/{} on {}: {}",
                base,
                self.settlement_currency,
                self.date.date(),
                rate
            );
            rate
        } else {
            Decimal::ONE
        };
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ExchangeRate);
        self.trigger_converted_lump_sum(self.convert_forward(self.lump_sum));
    }

    // ------------------------------------------------------------------
    // Value mutators
    // ------------------------------------------------------------------

    pub fn set_shares(&mut self, shares: ShareQuantity) {
        self.shares = shares;
        self.events.emit_field(EntryField::Shares);
        if !self.quote.is_zero() {
            self.trigger_lump_sum(Amount::from_decimal_lossy(
                shares.to_decimal() * self.quote.to_decimal(),
            ));
        } else if !self.lump_sum.is_zero() && !shares.is_zero() {
            self.quote =
                QuotePrice::from_decimal_lossy(self.lump_sum.to_decimal() / shares.to_decimal());
            self.events.emit_field(EntryField::Quote);
        }
    }

    pub fn set_quote(&mut self, quote: QuotePrice) {
        self.quote = quote;
        self.events.emit_field(EntryField::Quote);
        if !self.shares.is_zero() {
            self.trigger_lump_sum(Amount::from_decimal_lossy(
                self.shares.to_decimal() * quote.to_decimal(),
            ));
        } else if !self.lump_sum.is_zero() && !quote.is_zero() {
            self.shares =
                ShareQuantity::from_decimal_lossy(self.lump_sum.to_decimal() / quote.to_decimal());
            self.events.emit_field(EntryField::Shares);
        }
    }

    pub fn set_lump_sum(&mut self, lump_sum: Amount) {
        self.trigger_lump_sum(lump_sum);
        self.back_solve_quote();
    }

    pub fn set_exchange_rate(&mut self, rate: Decimal) {
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ExchangeRate);
        self.trigger_converted_lump_sum(self.convert_forward(self.lump_sum));
    }

    pub fn set_converted_lump_sum(&mut self, converted: Amount) {
        self.converted_lump_sum = converted;
        self.events.emit_field(EntryField::ConvertedLumpSum);
        self.trigger_total(
            self.policy
                .total_from_parts(converted, self.fees, self.taxes),
        );
        if !self.is_cross_currency() {
            self.lump_sum = converted;
            self.events.emit_field(EntryField::LumpSum);
            self.back_solve_quote();
        } else if !self.exchange_rate.is_zero() {
            self.lump_sum = Amount::from_decimal_lossy(converted.to_decimal() / self.exchange_rate);
            self.events.emit_field(EntryField::LumpSum);
            self.back_solve_quote();
        }
    }

    pub fn set_fees(&mut self, fees: Amount) {
        self.fees = fees;
        self.events.emit_field(EntryField::Fees);
        self.trigger_total(
            self.policy
                .total_from_parts(self.converted_lump_sum, fees, self.taxes),
        );
    }

    pub fn set_taxes(&mut self, taxes: Amount) {
        self.taxes = taxes;
        self.events.emit_field(EntryField::Taxes);
        self.trigger_total(
            self.policy
                .total_from_parts(self.converted_lump_sum, self.fees, taxes),
        );
    }

    /// Back-solves the chain total -> converted lump sum -> lump sum ->
    /// quote, leaving shares, fees and taxes untouched.
    pub fn set_total(&mut self, total: Amount) {
        self.total = total;
        self.events.emit_field(EntryField::Total);
        self.converted_lump_sum = self.policy.gross_from_total(total, self.fees, self.taxes);
        self.events.emit_field(EntryField::ConvertedLumpSum);
        if !self.is_cross_currency() {
            self.lump_sum = self.converted_lump_sum;
            self.events.emit_field(EntryField::LumpSum);
            self.back_solve_quote();
        } else if !self.exchange_rate.is_zero() {
            self.lump_sum = Amount::from_decimal_lossy(
                self.converted_lump_sum.to_decimal() / self.exchange_rate,
            );
            self.events.emit_field(EntryField::LumpSum);
            self.back_solve_quote();
        }
    }

    pub fn set_note(&mut self, note: &str) {
        self.note = note.to_string();
        self.events.emit_field(EntryField::Note);
    }

    // ------------------------------------------------------------------
    // Trigger primitives - forward cascade only
    // ------------------------------------------------------------------

    pub fn trigger_lump_sum(&mut self, lump_sum: Amount) {
        self.lump_sum = lump_sum;
        self.events.emit_field(EntryField::LumpSum);
        self.trigger_converted_lump_sum(self.convert_forward(lump_sum));
    }

    pub fn trigger_converted_lump_sum(&mut self, converted: Amount) {
        self.converted_lump_sum = converted;
        self.events.emit_field(EntryField::ConvertedLumpSum);
        self.trigger_total(
            self.policy
                .total_from_parts(converted, self.fees, self.taxes),
        );
    }

    pub fn trigger_total(&mut self, total: Amount) {
        self.total = total;
        self.events.emit_field(EntryField::Total);
    }

    fn convert_forward(&self, lump_sum: Amount) -> Amount {
        if self.is_cross_currency() {
            Amount::from_decimal_lossy(lump_sum.to_decimal() * self.exchange_rate)
        } else {
            lump_sum
        }
    }

    fn back_solve_quote(&mut self) {
        if !self.shares.is_zero() {
            self.quote = QuotePrice::from_decimal_lossy(
                self.lump_sum.to_decimal() / self.shares.to_decimal(),
            );
            self.events.emit_field(EntryField::Quote);
        }
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// The numeric part of the validation: tolerance invariants first, then
    /// the mandatory total. Selection checks are the wrapping variant's.
    pub fn calculation_status(&self) -> ValidationStatus {
        if self.fees.is_negative() {
            return ValidationStatus::error(ValidationIssue::ToleranceViolation(
                "fees".to_string(),
            ));
        }
        if self.taxes.is_negative() {
            return ValidationStatus::error(ValidationIssue::ToleranceViolation(
                "taxes".to_string(),
            ));
        }
        if !quote_consistent(self.shares, self.quote, self.lump_sum) {
            return ValidationStatus::error(ValidationIssue::ToleranceViolation(
                "quote".to_string(),
            ));
        }
        if !conversion_consistent(self.lump_sum, self.exchange_rate, self.converted_lump_sum) {
            return ValidationStatus::error(ValidationIssue::ToleranceViolation(
                "exchangeRate".to_string(),
            ));
        }
        if self.total
            != self
                .policy
                .total_from_parts(self.converted_lump_sum, self.fees, self.taxes)
        {
            return ValidationStatus::error(ValidationIssue::UnreconciledTotal);
        }
        if !self.allow_zero_total && self.total.is_zero() {
            return ValidationStatus::error(ValidationIssue::ZeroMandatoryAmount(
                "total".to_string(),
            ));
        }
        ValidationStatus::Ok
    }

    /// Stores and republishes the given status.
    pub fn publish_status(&mut self, status: ValidationStatus) {
        self.status = status;
        self.events.emit_status(&self.status);
    }

    /// Zeroes every derived amount while keeping date and selections, for
    /// rapid sequential entry.
    pub fn reset_amounts(&mut self) {
        self.shares = ShareQuantity::ZERO;
        self.quote = QuotePrice::ZERO;
        self.lump_sum = Amount::ZERO;
        self.converted_lump_sum = Amount::ZERO;
        self.fees = Amount::ZERO;
        self.taxes = Amount::ZERO;
        self.total = Amount::ZERO;
        for field in [
            EntryField::Shares,
            EntryField::Quote,
            EntryField::LumpSum,
            EntryField::ConvertedLumpSum,
            EntryField::Fees,
            EntryField::Taxes,
            EntryField::Total,
        ] {
            self.events.emit_field(field);
        }
    }
}
