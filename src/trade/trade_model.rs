use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, OwnerRef, Portfolio, Security, SignPolicy, SourceRef, Transaction, TransactionKind,
    TransactionStoreTrait, UnitKind,
};
use crate::editor::{EntryDefaults, EntryEventSink, EntryField, SecurityEntryCalc};
use crate::errors::{Error, Result};
use crate::fx::RateProviderTrait;
use crate::holdings::{HoldingsScope, HoldingsViewTrait};
use crate::money::{Amount, MonetaryAmount, QuotePrice, ShareQuantity};
use crate::reconcile::{assemble_units, reconcile_transaction, resolve_apply_mode};
use crate::validation::{ValidationIssue, ValidationStatus};

/// The four trade directions the model edits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeKind {
    Buy,
    Sell,
    /// Securities received without a cash leg.
    DeliveryInbound,
    /// Securities handed out without a cash leg.
    DeliveryOutbound,
}

impl TradeKind {
    pub fn sign_policy(&self) -> SignPolicy {
        match self {
            TradeKind::Buy | TradeKind::DeliveryInbound => SignPolicy::Acquisition,
            TradeKind::Sell | TradeKind::DeliveryOutbound => SignPolicy::Disposal,
        }
    }

    /// Deliveries settle against the portfolio, not a cash account.
    pub fn is_delivery(&self) -> bool {
        matches!(self, TradeKind::DeliveryInbound | TradeKind::DeliveryOutbound)
    }

    pub fn is_disposal(&self) -> bool {
        self.sign_policy() == SignPolicy::Disposal
    }

    pub fn transaction_kind(&self) -> TransactionKind {
        match self {
            TradeKind::Buy => TransactionKind::Buy,
            TradeKind::Sell => TransactionKind::Sell,
            TradeKind::DeliveryInbound => TransactionKind::DeliveryInbound,
            TradeKind::DeliveryOutbound => TransactionKind::DeliveryOutbound,
        }
    }

    /// Deliveries may carry a zero value (gifts, corporate actions); buys
    /// and sells must settle a positive total.
    fn allows_zero_total(&self) -> bool {
        self.is_delivery()
    }
}

/// Editing model for buying, selling and deliveries.
///
/// Wraps the shared calculation core with the trade-specific selections
/// (account, portfolio), the holdings pre-fill for disposals, seeding from
/// a persisted transaction and the apply/reset lifecycle. Every public
/// mutation ends by recomputing and republishing the validation status.
pub struct TradeEntryModel {
    kind: TradeKind,
    calc: SecurityEntryCalc,
    account: Option<Account>,
    portfolio: Option<Portfolio>,
    source: Option<SourceRef>,
    holdings: Arc<dyn HoldingsViewTrait>,
}

impl TradeEntryModel {
    pub fn new(
        kind: TradeKind,
        defaults: &EntryDefaults,
        rates: Arc<dyn RateProviderTrait>,
        holdings: Arc<dyn HoldingsViewTrait>,
    ) -> Self {
        let mut model = TradeEntryModel {
            kind,
            calc: SecurityEntryCalc::new(
                kind.sign_policy(),
                kind.allows_zero_total(),
                defaults,
                rates,
            ),
            account: None,
            portfolio: None,
            source: None,
            holdings,
        };
        model.revalidate();
        model
    }

    pub fn register_sink(&mut self, sink: Arc<dyn EntryEventSink>) {
        self.calc.register_sink(sink);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn kind(&self) -> TradeKind {
        self.kind
    }

    pub fn calc(&self) -> &SecurityEntryCalc {
        &self.calc
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref()
    }

    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }

    pub fn status(&self) -> &ValidationStatus {
        self.calc.status()
    }

    // ------------------------------------------------------------------
    // Selection mutators
    // ------------------------------------------------------------------

    pub fn set_security(&mut self, security: Option<Security>) {
        self.calc.set_security(security);
        self.prefill_disposal_shares();
        self.revalidate();
    }

    pub fn set_account(&mut self, account: Option<Account>) {
        let currency = account
            .as_ref()
            .map(|a| a.currency.clone())
            .unwrap_or_default();
        self.account = account;
        self.calc.events.emit_field(EntryField::Account);
        if !self.kind.is_delivery() {
            self.calc.set_settlement_currency(&currency);
        }
        self.revalidate();
    }

    pub fn set_portfolio(&mut self, portfolio: Option<Portfolio>) {
        let currency = portfolio
            .as_ref()
            .map(|p| p.reference_currency.clone())
            .unwrap_or_default();
        self.portfolio = portfolio;
        self.calc.events.emit_field(EntryField::Portfolio);
        if self.kind.is_delivery() {
            self.calc.set_settlement_currency(&currency);
        }
        self.prefill_disposal_shares();
        self.revalidate();
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.calc.set_date(date);
        self.revalidate();
    }

    // ------------------------------------------------------------------
    // Value mutators - delegate to the calculation core, then revalidate
    // ------------------------------------------------------------------

    pub fn set_shares(&mut self, shares: ShareQuantity) {
        self.calc.set_shares(shares);
        self.revalidate();
    }

    pub fn set_quote(&mut self, quote: QuotePrice) {
        self.calc.set_quote(quote);
        self.revalidate();
    }

    pub fn set_lump_sum(&mut self, lump_sum: Amount) {
        self.calc.set_lump_sum(lump_sum);
        self.revalidate();
    }

    pub fn set_exchange_rate(&mut self, rate: Decimal) {
        self.calc.set_exchange_rate(rate);
        self.revalidate();
    }

    pub fn set_converted_lump_sum(&mut self, converted: Amount) {
        self.calc.set_converted_lump_sum(converted);
        self.revalidate();
    }

    pub fn set_fees(&mut self, fees: Amount) {
        self.calc.set_fees(fees);
        self.revalidate();
    }

    pub fn set_taxes(&mut self, taxes: Amount) {
        self.calc.set_taxes(taxes);
        self.revalidate();
    }

    pub fn set_total(&mut self, total: Amount) {
        self.calc.set_total(total);
        self.revalidate();
    }

    pub fn set_note(&mut self, note: &str) {
        self.calc.set_note(note);
        self.revalidate();
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seeds the model from a persisted transaction. Selections (account,
    /// portfolio) are expected to be in place; shares, quote, lump sum and
    /// exchange rate are back-derived from the stored amount and units.
    pub fn load_source(&mut self, security: Security, transaction: &Transaction, owner: OwnerRef) {
        self.source = Some(SourceRef {
            transaction_id: transaction.id.clone(),
            owner,
        });
        self.calc.set_security(Some(security));
        self.calc.date = transaction.date;
        self.calc.events.emit_field(EntryField::Date);

        let policy = self.kind.sign_policy();
        let total = transaction.amount.value();
        let fees = transaction.unit_total(UnitKind::Fee);
        let taxes = transaction.unit_total(UnitKind::Tax);
        let converted = policy.gross_from_total(total, fees, taxes);

        // Adopt the stored rate and foreign amount only when the unit's
        // pairing still matches the selected account/security currencies;
        // a stale pairing degrades to a same-currency edit.
        let matching_forex = transaction.gross_value_unit().and_then(|unit| {
            let forex = unit.forex()?;
            let matches = forex.amount.currency() == self.calc.security_currency()
                && unit.amount().currency() == self.calc.settlement_currency();
            matches.then(|| (forex.amount.value(), forex.rate))
        });
        let (lump_sum, rate) = match matching_forex {
            Some((foreign, rate)) => (foreign, rate),
            None => (converted, Decimal::ONE),
        };

        self.calc.shares = transaction.shares;
        self.calc.total = total;
        self.calc.fees = fees;
        self.calc.taxes = taxes;
        self.calc.converted_lump_sum = converted;
        self.calc.lump_sum = lump_sum;
        self.calc.exchange_rate = rate;
        self.calc.quote = if transaction.shares.is_zero() {
            QuotePrice::ZERO
        } else {
            QuotePrice::from_decimal_lossy(
                lump_sum.to_decimal() / transaction.shares.to_decimal(),
            )
        };
        self.calc.note = transaction.note.clone().unwrap_or_default();

        for field in [
            EntryField::Shares,
            EntryField::Quote,
            EntryField::LumpSum,
            EntryField::ExchangeRate,
            EntryField::ConvertedLumpSum,
            EntryField::Fees,
            EntryField::Taxes,
            EntryField::Total,
            EntryField::Note,
        ] {
            self.calc.events.emit_field(field);
        }
        self.revalidate();
        if !self.calc.status().is_ok() {
            log::warn!(
                "seeded transaction {} does not validate: {:?}",
                transaction.id,
                self.calc.status()
            );
        }
    }

    /// Clears the source reference and zeroes all amounts while keeping the
    /// date and selections, for rapid sequential entry.
    pub fn reset_to_new(&mut self) {
        self.source = None;
        self.calc.reset_amounts();
        self.revalidate();
    }

    /// Writes the edit back to the store: in place when the owner is
    /// unchanged, otherwise delete-and-recreate under the new owner.
    pub fn apply_changes(&mut self, store: &mut dyn TransactionStoreTrait) -> Result<Transaction> {
        if !self.calc.status().is_ok() {
            return Err(Error::ContractViolation(format!(
                "apply_changes on a non-valid model: {:?}",
                self.calc.status()
            )));
        }
        let owner = self.target_owner()?;
        let mode = resolve_apply_mode(self.source.as_ref(), &owner);

        let settlement = self.calc.settlement_currency().to_string();
        let security = self.calc.security().cloned().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a security".to_string())
        })?;
        let gross = self.calc.is_cross_currency().then(|| {
            (
                MonetaryAmount::new(settlement.clone(), self.calc.converted_lump_sum()),
                MonetaryAmount::new(self.calc.security_currency(), self.calc.lump_sum()),
                self.calc.exchange_rate(),
            )
        });
        let units = assemble_units(
            Some(MonetaryAmount::new(settlement.clone(), self.calc.fees())),
            Some(MonetaryAmount::new(settlement.clone(), self.calc.taxes())),
            gross,
        )
        .map_err(Error::Domain)?;

        let mut built = Transaction::new(
            self.kind.transaction_kind(),
            self.calc.date(),
            MonetaryAmount::new(settlement, self.calc.total()),
        );
        built.security_id = Some(security.id);
        built.shares = self.calc.shares();
        built.note = (!self.calc.note().is_empty()).then(|| self.calc.note().to_string());
        built.units = units;

        let source_id = self.source.as_ref().map(|s| s.transaction_id.clone());
        let written =
            reconcile_transaction(store, &mode, &owner, source_id.as_deref(), built)
                .map_err(Error::Domain)?;

        self.source = Some(SourceRef {
            transaction_id: written.id.clone(),
            owner,
        });
        Ok(written)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn target_owner(&self) -> Result<OwnerRef> {
        if self.kind.is_delivery() {
            self.portfolio
                .as_ref()
                .map(|p| OwnerRef::Portfolio(p.id.clone()))
                .ok_or_else(|| {
                    Error::ContractViolation("apply_changes without a portfolio".to_string())
                })
        } else {
            self.account
                .as_ref()
                .map(|a| OwnerRef::Account(a.id.clone()))
                .ok_or_else(|| {
                    Error::ContractViolation("apply_changes without an account".to_string())
                })
        }
    }

    /// Disposals of an existing position suggest the currently held share
    /// count - new entries only, and only while no shares were entered.
    fn prefill_disposal_shares(&mut self) {
        if !self.kind.is_disposal() || self.source.is_some() || !self.calc.shares().is_zero() {
            return;
        }
        let Some(security) = self.calc.security() else {
            return;
        };
        let scope = match &self.portfolio {
            Some(portfolio) => HoldingsScope::Portfolio(portfolio.id.clone()),
            None => HoldingsScope::Client,
        };
        if let Some(snapshot) =
            self.holdings
                .position_at(&scope, &security.id, self.calc.date().date())
        {
            log::debug!(
                "pre-filling {} shares held in {:?}",
                snapshot.shares.to_decimal(),
                scope
            );
            self.calc.set_shares(snapshot.shares);
        }
    }

    fn selection_status(&self) -> Option<ValidationIssue> {
        if self.calc.security().is_none() {
            return Some(ValidationIssue::MissingSelection("security".to_string()));
        }
        if self.portfolio.is_none() {
            return Some(ValidationIssue::MissingSelection("portfolio".to_string()));
        }
        if !self.kind.is_delivery() && self.account.is_none() {
            return Some(ValidationIssue::MissingSelection("account".to_string()));
        }
        None
    }

    fn revalidate(&mut self) {
        let status = match self.selection_status() {
            Some(issue) => ValidationStatus::error(issue),
            None => {
                let status = self.calc.calculation_status();
                if status.is_ok() && self.calc.shares().is_zero() {
                    ValidationStatus::error(ValidationIssue::ZeroMandatoryAmount(
                        "shares".to_string(),
                    ))
                } else {
                    status
                }
            }
        };
        self.calc.publish_status(status);
    }
}
