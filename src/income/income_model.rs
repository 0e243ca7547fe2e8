use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::RATE_SCALE;
use crate::domain::{
    Account, OwnerRef, Security, SourceRef, Transaction, TransactionKind, TransactionStoreTrait,
};
use crate::editor::{EntryDefaults, EntryEventRegistry, EntryEventSink, EntryField};
use crate::errors::{Error, Result};
use crate::fx::RateProviderTrait;
use crate::holdings::{HoldingsScope, HoldingsViewTrait};
use crate::money::{Amount, MonetaryAmount, ShareQuantity};
use crate::reconcile::{assemble_units, reconcile_transaction, resolve_apply_mode};
use crate::validation::{conversion_consistent, ValidationIssue, ValidationStatus};

/// The account-transaction family edited with a single settlement amount.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeKind {
    Dividend,
    Tax,
    TaxRefund,
    Fee,
    FeeRefund,
    Interest,
    InterestCharge,
    Deposit,
    Removal,
}

impl IncomeKind {
    /// Only dividends and tax refunds reference a security; a tax refund
    /// without one is a blanket account credit.
    pub fn supports_security(&self) -> bool {
        matches!(self, IncomeKind::Dividend | IncomeKind::TaxRefund)
    }

    pub fn requires_security(&self) -> bool {
        matches!(self, IncomeKind::Dividend)
    }

    /// Only dividends carry a share count.
    pub fn supports_shares(&self) -> bool {
        matches!(self, IncomeKind::Dividend)
    }

    pub fn transaction_kind(&self) -> TransactionKind {
        match self {
            IncomeKind::Dividend => TransactionKind::Dividend,
            IncomeKind::Tax => TransactionKind::Tax,
            IncomeKind::TaxRefund => TransactionKind::TaxRefund,
            IncomeKind::Fee => TransactionKind::Fee,
            IncomeKind::FeeRefund => TransactionKind::FeeRefund,
            IncomeKind::Interest => TransactionKind::Interest,
            IncomeKind::InterestCharge => TransactionKind::InterestCharge,
            IncomeKind::Deposit => TransactionKind::Deposit,
            IncomeKind::Removal => TransactionKind::Removal,
        }
    }
}

/// Editing model for the account-transaction family.
///
/// One settlement-currency amount, with an optional one-sided forex
/// annotation when the instrument trades in another currency: a foreign
/// amount times the exchange rate yields the settlement amount. Setting the
/// settlement amount while a foreign amount is known back-solves the rate,
/// keeping the entered foreign amount stable.
pub struct IncomeEntryModel {
    kind: IncomeKind,
    account: Option<Account>,
    security: Option<Security>,
    date: NaiveDateTime,
    shares: ShareQuantity,
    foreign_amount: Amount,
    exchange_rate: Decimal,
    amount: Amount,
    note: String,
    status: ValidationStatus,
    source: Option<SourceRef>,
    events: EntryEventRegistry,
    rates: Arc<dyn RateProviderTrait>,
    holdings: Arc<dyn HoldingsViewTrait>,
}

impl IncomeEntryModel {
    pub fn new(
        kind: IncomeKind,
        defaults: &EntryDefaults,
        rates: Arc<dyn RateProviderTrait>,
        holdings: Arc<dyn HoldingsViewTrait>,
    ) -> Self {
        let mut model = IncomeEntryModel {
            kind,
            account: None,
            security: None,
            date: defaults.entry_timestamp(),
            shares: ShareQuantity::ZERO,
            foreign_amount: Amount::ZERO,
            exchange_rate: Decimal::ONE,
            amount: Amount::ZERO,
            note: String::new(),
            status: ValidationStatus::Ok,
            source: None,
            events: EntryEventRegistry::new(),
            rates,
            holdings,
        };
        model.revalidate();
        model
    }

    pub fn register_sink(&mut self, sink: Arc<dyn EntryEventSink>) {
        self.events.register(sink);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn kind(&self) -> IncomeKind {
        self.kind
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn security(&self) -> Option<&Security> {
        self.security.as_ref()
    }

    pub fn settlement_currency(&self) -> &str {
        self.account.as_ref().map(|a| a.currency.as_str()).unwrap_or("")
    }

    pub fn security_currency(&self) -> &str {
        self.security.as_ref().map(|s| s.currency.as_str()).unwrap_or("")
    }

    /// Whether the instrument trades in a currency other than the
    /// account's. False while either selection is missing.
    pub fn is_cross_currency(&self) -> bool {
        !self.security_currency().is_empty()
            && !self.settlement_currency().is_empty()
            && self.security_currency() != self.settlement_currency()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn shares(&self) -> ShareQuantity {
        self.shares
    }

    pub fn foreign_amount(&self) -> Amount {
        self.foreign_amount
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn status(&self) -> &ValidationStatus {
        &self.status
    }

    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }

    // ------------------------------------------------------------------
    // Selection mutators
    // ------------------------------------------------------------------

    pub fn set_account(&mut self, account: Option<Account>) {
        self.account = account;
        self.events.emit_field(EntryField::Account);
        self.events.emit_field(EntryField::TransactionCurrency);
        self.refresh_exchange_rate();
        self.revalidate();
    }

    pub fn set_security(&mut self, security: Option<Security>) {
        if !self.kind.supports_security() {
            log::debug!("{:?} entries carry no security, ignoring selection", self.kind);
            return;
        }
        self.security = security;
        self.events.emit_field(EntryField::Security);
        self.events.emit_field(EntryField::SecurityCurrency);
        self.refresh_exchange_rate();
        self.prefill_dividend_shares();
        self.revalidate();
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.date = date;
        self.events.emit_field(EntryField::Date);
        self.refresh_exchange_rate();
        self.prefill_dividend_shares();
        self.revalidate();
    }

    // ------------------------------------------------------------------
    // Value mutators
    // ------------------------------------------------------------------

    pub fn set_shares(&mut self, shares: ShareQuantity) {
        if !self.kind.supports_shares() {
            log::debug!("{:?} entries carry no shares, ignoring", self.kind);
            return;
        }
        self.shares = shares;
        self.events.emit_field(EntryField::Shares);
        self.revalidate();
    }

    pub fn set_foreign_amount(&mut self, foreign: Amount) {
        self.foreign_amount = foreign;
        self.events.emit_field(EntryField::ForeignAmount);
        self.trigger_amount(Amount::from_decimal_lossy(
            foreign.to_decimal() * self.exchange_rate,
        ));
        self.revalidate();
    }

    pub fn set_exchange_rate(&mut self, rate: Decimal) {
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ExchangeRate);
        if !self.foreign_amount.is_zero() {
            self.trigger_amount(Amount::from_decimal_lossy(
                self.foreign_amount.to_decimal() * rate,
            ));
        }
        self.revalidate();
    }

    /// Setting the settlement amount with a known foreign amount re-derives
    /// the exchange rate - the one unambiguous sibling.
    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
        self.events.emit_field(EntryField::Amount);
        if self.is_cross_currency() && !self.foreign_amount.is_zero() {
            self.exchange_rate = (amount.to_decimal() / self.foreign_amount.to_decimal())
                .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointTowardZero);
            self.events.emit_field(EntryField::ExchangeRate);
        }
        self.revalidate();
    }

    pub fn set_note(&mut self, note: &str) {
        self.note = note.to_string();
        self.events.emit_field(EntryField::Note);
        self.revalidate();
    }

    fn trigger_amount(&mut self, amount: Amount) {
        self.amount = amount;
        self.events.emit_field(EntryField::Amount);
    }

    fn refresh_exchange_rate(&mut self) {
        let rate = if self.is_cross_currency() {
            let base = self.security_currency().to_string();
            self.rates
                .lookup_rate(&base, self.settlement_currency(), self.date.date())
                .unwrap_or(Decimal::ONE)
        } else {
            Decimal::ONE
        };
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ExchangeRate);
        if self.is_cross_currency() && !self.foreign_amount.is_zero() {
            self.trigger_amount(Amount::from_decimal_lossy(
                self.foreign_amount.to_decimal() * rate,
            ));
        }
    }

    /// Dividends suggest the share count held as of the transaction date -
    /// new entries only.
    fn prefill_dividend_shares(&mut self) {
        if !self.kind.supports_shares() || self.source.is_some() {
            return;
        }
        let Some(security) = self.security.as_ref() else {
            return;
        };
        if let Some(snapshot) =
            self.holdings
                .position_at(&HoldingsScope::Client, &security.id, self.date.date())
        {
            self.shares = snapshot.shares;
            self.events.emit_field(EntryField::Shares);
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seeds the model from a persisted transaction. The account selection
    /// is expected to be in place.
    pub fn load_source(
        &mut self,
        security: Option<Security>,
        transaction: &Transaction,
        owner: OwnerRef,
    ) {
        self.source = Some(SourceRef {
            transaction_id: transaction.id.clone(),
            owner,
        });
        if self.kind.supports_security() {
            self.security = security;
            self.events.emit_field(EntryField::Security);
            self.events.emit_field(EntryField::SecurityCurrency);
        }
        self.date = transaction.date;
        self.events.emit_field(EntryField::Date);
        self.shares = transaction.shares;
        self.events.emit_field(EntryField::Shares);
        self.amount = transaction.amount.value();
        self.events.emit_field(EntryField::Amount);

        let matching_forex = transaction.gross_value_unit().and_then(|unit| {
            let forex = unit.forex()?;
            let matches = forex.amount.currency() == self.security_currency()
                && unit.amount().currency() == self.settlement_currency();
            matches.then(|| (forex.amount.value(), forex.rate))
        });
        let (foreign, rate) = matching_forex.unwrap_or((Amount::ZERO, Decimal::ONE));
        self.foreign_amount = foreign;
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ForeignAmount);
        self.events.emit_field(EntryField::ExchangeRate);

        self.note = transaction.note.clone().unwrap_or_default();
        self.events.emit_field(EntryField::Note);
        self.revalidate();
    }

    /// Clears the source reference and zeroes the amounts while keeping the
    /// date and selections.
    pub fn reset_to_new(&mut self) {
        self.source = None;
        self.shares = ShareQuantity::ZERO;
        self.foreign_amount = Amount::ZERO;
        self.amount = Amount::ZERO;
        for field in [
            EntryField::Shares,
            EntryField::ForeignAmount,
            EntryField::Amount,
        ] {
            self.events.emit_field(field);
        }
        self.revalidate();
    }

    pub fn apply_changes(&mut self, store: &mut dyn TransactionStoreTrait) -> Result<Transaction> {
        if !self.status.is_ok() {
            return Err(Error::ContractViolation(format!(
                "apply_changes on a non-valid model: {:?}",
                self.status
            )));
        }
        let account = self.account.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without an account".to_string())
        })?;
        let owner = OwnerRef::Account(account.id.clone());
        let mode = resolve_apply_mode(self.source.as_ref(), &owner);

        let settlement = account.currency.clone();
        let gross = (self.is_cross_currency() && !self.foreign_amount.is_zero()).then(|| {
            (
                MonetaryAmount::new(settlement.clone(), self.amount),
                MonetaryAmount::new(self.security_currency(), self.foreign_amount),
                self.exchange_rate,
            )
        });
        let units = assemble_units(None, None, gross).map_err(Error::Domain)?;

        let mut built = Transaction::new(
            self.kind.transaction_kind(),
            self.date,
            MonetaryAmount::new(settlement, self.amount),
        );
        built.security_id = self.security.as_ref().map(|s| s.id.clone());
        built.shares = self.shares;
        built.note = (!self.note.is_empty()).then(|| self.note.clone());
        built.units = units;

        let source_id = self.source.as_ref().map(|s| s.transaction_id.clone());
        let written = reconcile_transaction(store, &mode, &owner, source_id.as_deref(), built)
            .map_err(Error::Domain)?;

        self.source = Some(SourceRef {
            transaction_id: written.id.clone(),
            owner,
        });
        Ok(written)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn revalidate(&mut self) {
        let status = match self.compute_status() {
            Some(issue) => ValidationStatus::error(issue),
            None => ValidationStatus::Ok,
        };
        self.status = status;
        self.events.emit_status(&self.status);
    }

    fn compute_status(&self) -> Option<ValidationIssue> {
        if self.account.is_none() {
            return Some(ValidationIssue::MissingSelection("account".to_string()));
        }
        if self.kind.requires_security() && self.security.is_none() {
            return Some(ValidationIssue::MissingSelection("security".to_string()));
        }
        if self.is_cross_currency()
            && !self.foreign_amount.is_zero()
            && !conversion_consistent(self.foreign_amount, self.exchange_rate, self.amount)
        {
            return Some(ValidationIssue::ToleranceViolation(
                "exchangeRate".to_string(),
            ));
        }
        if self.amount.is_zero() || self.amount.is_negative() {
            return Some(ValidationIssue::ZeroMandatoryAmount("amount".to_string()));
        }
        None
    }
}
