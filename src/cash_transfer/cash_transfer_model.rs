use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::constants::RATE_SCALE;
use crate::domain::{
    Account, OwnerRef, SourceRef, Transaction, TransactionKind, TransactionStoreTrait,
    TransactionUnit, TransferSourceRef,
};
use crate::editor::{EntryDefaults, EntryEventRegistry, EntryEventSink, EntryField};
use crate::errors::{Error, Result};
use crate::fx::RateProviderTrait;
use crate::money::{Amount, ExchangeRate, MonetaryAmount};
use crate::validation::{conversion_consistent, ValidationIssue, ValidationStatus};

/// Editing model for moving cash between two accounts.
///
/// With matching currencies one amount mirrors onto both legs. With
/// different currencies the source leg stores the source-currency amount,
/// the target leg the target-currency amount, and a forex unit pairing the
/// two goes onto the source leg. The editing rate is in target-per-source
/// notation; the persisted unit carries its inverse, converting the foreign
/// (target) amount back into the source leg's settlement currency.
pub struct CashTransferModel {
    source_account: Option<Account>,
    target_account: Option<Account>,
    date: NaiveDateTime,
    amount: Amount,
    exchange_rate: Decimal,
    target_amount: Amount,
    note: String,
    status: ValidationStatus,
    source: Option<TransferSourceRef>,
    events: EntryEventRegistry,
    rates: Arc<dyn RateProviderTrait>,
}

impl CashTransferModel {
    pub fn new(defaults: &EntryDefaults, rates: Arc<dyn RateProviderTrait>) -> Self {
        let mut model = CashTransferModel {
            source_account: None,
            target_account: None,
            date: defaults.entry_timestamp(),
            amount: Amount::ZERO,
            exchange_rate: Decimal::ONE,
            target_amount: Amount::ZERO,
            note: String::new(),
            status: ValidationStatus::Ok,
            source: None,
            events: EntryEventRegistry::new(),
            rates,
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

    pub fn source_account(&self) -> Option<&Account> {
        self.source_account.as_ref()
    }

    pub fn target_account(&self) -> Option<&Account> {
        self.target_account.as_ref()
    }

    pub fn source_currency(&self) -> &str {
        self.source_account
            .as_ref()
            .map(|a| a.currency.as_str())
            .unwrap_or("")
    }

    pub fn target_currency(&self) -> &str {
        self.target_account
            .as_ref()
            .map(|a| a.currency.as_str())
            .unwrap_or("")
    }

    pub fn is_cross_currency(&self) -> bool {
        !self.source_currency().is_empty()
            && !self.target_currency().is_empty()
            && self.source_currency() != self.target_currency()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn target_amount(&self) -> Amount {
        self.target_amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn status(&self) -> &ValidationStatus {
        &self.status
    }

    pub fn source(&self) -> Option<&TransferSourceRef> {
        self.source.as_ref()
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    pub fn set_source_account(&mut self, account: Option<Account>) {
        self.source_account = account;
        self.events.emit_field(EntryField::SourceAccount);
        self.events.emit_field(EntryField::TransactionCurrency);
        self.refresh_exchange_rate();
        self.revalidate();
    }

    pub fn set_target_account(&mut self, account: Option<Account>) {
        self.target_account = account;
        self.events.emit_field(EntryField::TargetAccount);
        self.refresh_exchange_rate();
        self.revalidate();
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.date = date;
        self.events.emit_field(EntryField::Date);
        self.refresh_exchange_rate();
        self.revalidate();
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
        self.events.emit_field(EntryField::Amount);
        self.trigger_target_amount(Amount::from_decimal_lossy(
            amount.to_decimal() * self.exchange_rate,
        ));
        self.revalidate();
    }

    pub fn set_exchange_rate(&mut self, rate: Decimal) {
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ExchangeRate);
        self.trigger_target_amount(Amount::from_decimal_lossy(
            self.amount.to_decimal() * rate,
        ));
        self.revalidate();
    }

    /// Setting the target amount back-solves exactly one sibling: the rate
    /// while a source amount is known, the source amount otherwise.
    pub fn set_target_amount(&mut self, target_amount: Amount) {
        self.target_amount = target_amount;
        self.events.emit_field(EntryField::TargetAmount);
        if !self.amount.is_zero() {
            self.exchange_rate = (target_amount.to_decimal() / self.amount.to_decimal())
                .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointTowardZero);
            self.events.emit_field(EntryField::ExchangeRate);
        } else if !self.exchange_rate.is_zero() {
            self.amount =
                Amount::from_decimal_lossy(target_amount.to_decimal() / self.exchange_rate);
            self.events.emit_field(EntryField::Amount);
        }
        self.revalidate();
    }

    pub fn set_note(&mut self, note: &str) {
        self.note = note.to_string();
        self.events.emit_field(EntryField::Note);
        self.revalidate();
    }

    fn trigger_target_amount(&mut self, target_amount: Amount) {
        self.target_amount = target_amount;
        self.events.emit_field(EntryField::TargetAmount);
    }

    fn refresh_exchange_rate(&mut self) {
        let rate = if self.is_cross_currency() {
            let base = self.source_currency().to_string();
            self.rates
                .lookup_rate(&base, self.target_currency(), self.date.date())
                .unwrap_or(Decimal::ONE)
        } else {
            Decimal::ONE
        };
        self.exchange_rate = rate;
        self.events.emit_field(EntryField::ExchangeRate);
        self.trigger_target_amount(Amount::from_decimal_lossy(
            self.amount.to_decimal() * rate,
        ));
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seeds the model from both persisted legs. Account selections are
    /// expected to be in place.
    pub fn load_source(
        &mut self,
        outbound: &Transaction,
        inbound: &Transaction,
        outbound_owner: OwnerRef,
        inbound_owner: OwnerRef,
    ) {
        self.source = Some(TransferSourceRef {
            transfer_id: outbound
                .transfer_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            outbound: SourceRef {
                transaction_id: outbound.id.clone(),
                owner: outbound_owner,
            },
            inbound: SourceRef {
                transaction_id: inbound.id.clone(),
                owner: inbound_owner,
            },
        });
        self.date = outbound.date;
        self.amount = outbound.amount.value();
        self.target_amount = inbound.amount.value();
        self.exchange_rate = if self.amount.is_zero() || self.amount == self.target_amount {
            Decimal::ONE
        } else {
            (self.target_amount.to_decimal() / self.amount.to_decimal())
                .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointTowardZero)
        };
        self.note = outbound.note.clone().unwrap_or_default();
        for field in [
            EntryField::Date,
            EntryField::Amount,
            EntryField::TargetAmount,
            EntryField::ExchangeRate,
            EntryField::Note,
        ] {
            self.events.emit_field(field);
        }
        self.revalidate();
    }

    /// Clears the source reference and zeroes the amounts while keeping
    /// accounts and date.
    pub fn reset_to_new(&mut self) {
        self.source = None;
        self.amount = Amount::ZERO;
        self.target_amount = Amount::ZERO;
        self.events.emit_field(EntryField::Amount);
        self.events.emit_field(EntryField::TargetAmount);
        self.revalidate();
    }

    /// Writes both legs. The pair mutates in place only when both legs keep
    /// their owners; any owner change deletes and recreates the paired
    /// entry so the legs never diverge.
    pub fn apply_changes(
        &mut self,
        store: &mut dyn TransactionStoreTrait,
    ) -> Result<(Transaction, Transaction)> {
        if !self.status.is_ok() {
            return Err(Error::ContractViolation(format!(
                "apply_changes on a non-valid model: {:?}",
                self.status
            )));
        }
        let source_account = self.source_account.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a source account".to_string())
        })?;
        let target_account = self.target_account.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a target account".to_string())
        })?;
        let outbound_owner = OwnerRef::Account(source_account.id.clone());
        let inbound_owner = OwnerRef::Account(target_account.id.clone());

        let in_place_ids = self.source.as_ref().and_then(|source| {
            (source.outbound.owner == outbound_owner && source.inbound.owner == inbound_owner)
                .then(|| {
                    (
                        source.outbound.transaction_id.clone(),
                        source.inbound.transaction_id.clone(),
                    )
                })
        });
        let transfer_id = self
            .source
            .as_ref()
            .map(|source| source.transfer_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut outbound = Transaction::new(
            TransactionKind::TransferOut,
            self.date,
            MonetaryAmount::new(source_account.currency.clone(), self.amount),
        );
        outbound.transfer_id = Some(transfer_id.clone());
        outbound.note = (!self.note.is_empty()).then(|| self.note.clone());
        if self.is_cross_currency() {
            // the unit converts the foreign (target) amount back into the
            // source leg's settlement currency
            let unit_rate = ExchangeRate::new(
                source_account.currency.clone(),
                target_account.currency.clone(),
                self.exchange_rate,
            )
            .and_then(|rate| rate.inverse())
            .map_err(Error::Money)?
            .rate();
            outbound.units = vec![TransactionUnit::gross_value(
                MonetaryAmount::new(source_account.currency.clone(), self.amount),
                MonetaryAmount::new(target_account.currency.clone(), self.target_amount),
                unit_rate,
            )
            .map_err(Error::Domain)?];
        }

        let mut inbound = Transaction::new(
            TransactionKind::TransferIn,
            self.date,
            MonetaryAmount::new(target_account.currency.clone(), self.target_amount),
        );
        inbound.transfer_id = Some(transfer_id.clone());
        inbound.note = (!self.note.is_empty()).then(|| self.note.clone());

        if let Some((outbound_id, inbound_id)) = in_place_ids {
            log::debug!("updating transfer {} in place", transfer_id);
            outbound.id = outbound_id;
            inbound.id = inbound_id;
            store
                .replace_transaction(&outbound_owner, outbound.clone())
                .map_err(Error::Domain)?;
            store
                .replace_transaction(&inbound_owner, inbound.clone())
                .map_err(Error::Domain)?;
        } else {
            if let Some(source) = self.source.take() {
                log::debug!(
                    "recreating transfer {} under new owners",
                    source.transfer_id
                );
                store
                    .delete_transaction(&source.outbound.owner, &source.outbound.transaction_id)
                    .map_err(Error::Domain)?;
                store
                    .delete_transaction(&source.inbound.owner, &source.inbound.transaction_id)
                    .map_err(Error::Domain)?;
            }
            store
                .add_transaction(&outbound_owner, outbound.clone())
                .map_err(Error::Domain)?;
            store
                .add_transaction(&inbound_owner, inbound.clone())
                .map_err(Error::Domain)?;
        }

        self.source = Some(TransferSourceRef {
            transfer_id,
            outbound: SourceRef {
                transaction_id: outbound.id.clone(),
                owner: outbound_owner,
            },
            inbound: SourceRef {
                transaction_id: inbound.id.clone(),
                owner: inbound_owner,
            },
        });
        Ok((outbound, inbound))
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
        let Some(source) = self.source_account.as_ref() else {
            return Some(ValidationIssue::MissingSelection(
                "source account".to_string(),
            ));
        };
        let Some(target) = self.target_account.as_ref() else {
            return Some(ValidationIssue::MissingSelection(
                "target account".to_string(),
            ));
        };
        if source.id == target.id {
            return Some(ValidationIssue::DuplicateEndpoints("accounts".to_string()));
        }
        if self.is_cross_currency() {
            if !conversion_consistent(self.amount, self.exchange_rate, self.target_amount) {
                return Some(ValidationIssue::ToleranceViolation(
                    "exchangeRate".to_string(),
                ));
            }
        } else if self.amount != self.target_amount {
            return Some(ValidationIssue::UnreconciledTotal);
        }
        if self.amount.is_zero() || self.amount.is_negative() {
            return Some(ValidationIssue::ZeroMandatoryAmount("amount".to_string()));
        }
        None
    }
}
