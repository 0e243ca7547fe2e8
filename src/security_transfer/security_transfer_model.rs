use std::sync::Arc;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::{
    OwnerRef, Portfolio, Security, SourceRef, Transaction, TransactionKind,
    TransactionStoreTrait, TransferSourceRef,
};
use crate::editor::{EntryDefaults, EntryEventRegistry, EntryEventSink, EntryField};
use crate::errors::{Error, Result};
use crate::holdings::{HoldingsScope, HoldingsViewTrait};
use crate::money::{Amount, MonetaryAmount, QuotePrice, ShareQuantity};
use crate::validation::{quote_consistent, ValidationIssue, ValidationStatus};

/// Editing model for moving a security position between two portfolios at a
/// recorded price.
///
/// Everything is denominated in the security's own currency; there is no
/// forex chain. Shares and quote are suggested from the holdings snapshot of
/// the source portfolio (or the combined client snapshot while none is
/// selected) - for brand-new transfers only. Editing an existing transfer
/// never overwrites user-entered shares or quote from a fresh lookup.
pub struct SecurityTransferModel {
    source_portfolio: Option<Portfolio>,
    target_portfolio: Option<Portfolio>,
    security: Option<Security>,
    date: NaiveDateTime,
    shares: ShareQuantity,
    quote: QuotePrice,
    amount: Amount,
    note: String,
    status: ValidationStatus,
    source: Option<TransferSourceRef>,
    events: EntryEventRegistry,
    holdings: Arc<dyn HoldingsViewTrait>,
}

impl SecurityTransferModel {
    pub fn new(defaults: &EntryDefaults, holdings: Arc<dyn HoldingsViewTrait>) -> Self {
        let mut model = SecurityTransferModel {
            source_portfolio: None,
            target_portfolio: None,
            security: None,
            date: defaults.entry_timestamp(),
            shares: ShareQuantity::ZERO,
            quote: QuotePrice::ZERO,
            amount: Amount::ZERO,
            note: String::new(),
            status: ValidationStatus::Ok,
            source: None,
            events: EntryEventRegistry::new(),
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

    pub fn source_portfolio(&self) -> Option<&Portfolio> {
        self.source_portfolio.as_ref()
    }

    pub fn target_portfolio(&self) -> Option<&Portfolio> {
        self.target_portfolio.as_ref()
    }

    pub fn security(&self) -> Option<&Security> {
        self.security.as_ref()
    }

    pub fn security_currency(&self) -> &str {
        self.security.as_ref().map(|s| s.currency.as_str()).unwrap_or("")
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

    pub fn amount(&self) -> Amount {
        self.amount
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
    // Selection mutators
    // ------------------------------------------------------------------

    pub fn set_source_portfolio(&mut self, portfolio: Option<Portfolio>) {
        self.source_portfolio = portfolio;
        self.events.emit_field(EntryField::SourcePortfolio);
        self.suggest_position();
        self.revalidate();
    }

    pub fn set_target_portfolio(&mut self, portfolio: Option<Portfolio>) {
        self.target_portfolio = portfolio;
        self.events.emit_field(EntryField::TargetPortfolio);
        self.revalidate();
    }

    pub fn set_security(&mut self, security: Option<Security>) {
        self.security = security;
        self.events.emit_field(EntryField::Security);
        self.events.emit_field(EntryField::SecurityCurrency);
        self.suggest_position();
        self.revalidate();
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.date = date;
        self.events.emit_field(EntryField::Date);
        self.suggest_position();
        self.revalidate();
    }

    // ------------------------------------------------------------------
    // Value mutators
    // ------------------------------------------------------------------

    pub fn set_shares(&mut self, shares: ShareQuantity) {
        self.shares = shares;
        self.events.emit_field(EntryField::Shares);
        if !self.quote.is_zero() {
            self.trigger_amount(Amount::from_decimal_lossy(
                shares.to_decimal() * self.quote.to_decimal(),
            ));
        } else if !self.amount.is_zero() && !shares.is_zero() {
            self.quote =
                QuotePrice::from_decimal_lossy(self.amount.to_decimal() / shares.to_decimal());
            self.events.emit_field(EntryField::Quote);
        }
        self.revalidate();
    }

    pub fn set_quote(&mut self, quote: QuotePrice) {
        self.quote = quote;
        self.events.emit_field(EntryField::Quote);
        if !self.shares.is_zero() {
            self.trigger_amount(Amount::from_decimal_lossy(
                self.shares.to_decimal() * quote.to_decimal(),
            ));
        }
        self.revalidate();
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
        self.events.emit_field(EntryField::Amount);
        if !self.shares.is_zero() {
            self.quote =
                QuotePrice::from_decimal_lossy(amount.to_decimal() / self.shares.to_decimal());
            self.events.emit_field(EntryField::Quote);
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

    /// Suggests shares and quote from the held position - brand-new
    /// transfers only, so an edit never clobbers entered values.
    fn suggest_position(&mut self) {
        if self.source.is_some() {
            return;
        }
        let Some(security) = self.security.as_ref() else {
            return;
        };
        let scope = match &self.source_portfolio {
            Some(portfolio) => HoldingsScope::Portfolio(portfolio.id.clone()),
            None => HoldingsScope::Client,
        };
        let Some(snapshot) = self
            .holdings
            .position_at(&scope, &security.id, self.date.date())
        else {
            return;
        };
        self.shares = snapshot.shares;
        self.events.emit_field(EntryField::Shares);
        if !snapshot.shares.is_zero() {
            self.quote = QuotePrice::from_decimal_lossy(
                snapshot.value.to_decimal() / snapshot.shares.to_decimal(),
            );
            self.events.emit_field(EntryField::Quote);
            self.trigger_amount(snapshot.value.value());
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seeds the model from both persisted legs. Portfolio and security
    /// selections are expected to be in place.
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
        self.shares = outbound.shares;
        self.amount = outbound.amount.value();
        self.quote = if outbound.shares.is_zero() {
            QuotePrice::ZERO
        } else {
            QuotePrice::from_decimal_lossy(
                outbound.amount.to_decimal() / outbound.shares.to_decimal(),
            )
        };
        self.note = outbound.note.clone().unwrap_or_default();
        for field in [
            EntryField::Date,
            EntryField::Shares,
            EntryField::Quote,
            EntryField::Amount,
            EntryField::Note,
        ] {
            self.events.emit_field(field);
        }
        self.revalidate();
    }

    /// Clears the source reference and zeroes the position while keeping
    /// the portfolios, security and date.
    pub fn reset_to_new(&mut self) {
        self.source = None;
        self.shares = ShareQuantity::ZERO;
        self.quote = QuotePrice::ZERO;
        self.amount = Amount::ZERO;
        for field in [EntryField::Shares, EntryField::Quote, EntryField::Amount] {
            self.events.emit_field(field);
        }
        self.revalidate();
    }

    /// Writes both portfolio legs; in place only when both keep their
    /// owners, otherwise the pair is deleted and recreated.
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
        let source_portfolio = self.source_portfolio.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a source portfolio".to_string())
        })?;
        let target_portfolio = self.target_portfolio.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a target portfolio".to_string())
        })?;
        let security = self.security.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a security".to_string())
        })?;
        let outbound_owner = OwnerRef::Portfolio(source_portfolio.id.clone());
        let inbound_owner = OwnerRef::Portfolio(target_portfolio.id.clone());

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

        let build_leg = |kind: TransactionKind| {
            let mut leg = Transaction::new(
                kind,
                self.date,
                MonetaryAmount::new(security.currency.clone(), self.amount),
            );
            leg.security_id = Some(security.id.clone());
            leg.shares = self.shares;
            leg.transfer_id = Some(transfer_id.clone());
            leg.note = (!self.note.is_empty()).then(|| self.note.clone());
            leg
        };
        let mut outbound = build_leg(TransactionKind::TransferOut);
        let mut inbound = build_leg(TransactionKind::TransferIn);

        if let Some((outbound_id, inbound_id)) = in_place_ids {
            log::debug!("updating security transfer {} in place", transfer_id);
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
                    "recreating security transfer {} under new owners",
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
        if self.security.is_none() {
            return Some(ValidationIssue::MissingSelection("security".to_string()));
        }
        let Some(source) = self.source_portfolio.as_ref() else {
            return Some(ValidationIssue::MissingSelection(
                "source portfolio".to_string(),
            ));
        };
        let Some(target) = self.target_portfolio.as_ref() else {
            return Some(ValidationIssue::MissingSelection(
                "target portfolio".to_string(),
            ));
        };
        if source.id == target.id {
            return Some(ValidationIssue::DuplicateEndpoints(
                "portfolios".to_string(),
            ));
        }
        if !quote_consistent(self.shares, self.quote, self.amount) {
            return Some(ValidationIssue::ToleranceViolation("quote".to_string()));
        }
        if self.shares.is_zero() {
            return Some(ValidationIssue::ZeroMandatoryAmount("shares".to_string()));
        }
        None
    }
}
