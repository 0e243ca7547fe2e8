use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Account, Plan, Portfolio, Security, TransactionStoreTrait};
use crate::editor::{EntryDefaults, EntryEventRegistry, EntryEventSink, EntryField};
use crate::errors::{Error, Result};
use crate::money::{Amount, MonetaryAmount};
use crate::validation::{ValidationIssue, ValidationStatus};

/// Editing model for a recurring plan template.
///
/// No live forex or quote chain: a fixed periodic amount, optional fees, an
/// interval in months and a start date. Transactions generated from the plan
/// settle in the account's currency - or, when no cash account is linked
/// (deliver-without-cash-account mode), in the portfolio's
/// reference-account currency.
pub struct PlanEntryModel {
    name: String,
    security: Option<Security>,
    portfolio: Option<Portfolio>,
    account: Option<Account>,
    amount: Amount,
    fees: Amount,
    interval_months: u32,
    start_date: NaiveDate,
    auto_generate: bool,
    status: ValidationStatus,
    /// Id of the plan being edited; `None` while entering a new one.
    source_plan_id: Option<String>,
    events: EntryEventRegistry,
}

impl PlanEntryModel {
    pub fn new(defaults: &EntryDefaults) -> Self {
        let mut model = PlanEntryModel {
            name: String::new(),
            security: None,
            portfolio: None,
            account: None,
            amount: Amount::ZERO,
            fees: Amount::ZERO,
            interval_months: 1,
            start_date: defaults.today,
            auto_generate: false,
            status: ValidationStatus::Ok,
            source_plan_id: None,
            events: EntryEventRegistry::new(),
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn security(&self) -> Option<&Security> {
        self.security.as_ref()
    }

    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn fees(&self) -> Amount {
        self.fees
    }

    pub fn interval_months(&self) -> u32 {
        self.interval_months
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn auto_generate(&self) -> bool {
        self.auto_generate
    }

    pub fn status(&self) -> &ValidationStatus {
        &self.status
    }

    pub fn source_plan_id(&self) -> Option<&str> {
        self.source_plan_id.as_deref()
    }

    /// The currency transactions generated from this plan settle in: the
    /// account's, or the portfolio's reference currency when no cash
    /// account is linked. Empty while neither is selected.
    pub fn plan_currency(&self) -> &str {
        match (&self.account, &self.portfolio) {
            (Some(account), _) => &account.currency,
            (None, Some(portfolio)) => &portfolio.reference_currency,
            (None, None) => "",
        }
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.events.emit_field(EntryField::Name);
        self.revalidate();
    }

    pub fn set_security(&mut self, security: Option<Security>) {
        self.security = security;
        self.events.emit_field(EntryField::Security);
        self.revalidate();
    }

    pub fn set_portfolio(&mut self, portfolio: Option<Portfolio>) {
        self.portfolio = portfolio;
        self.events.emit_field(EntryField::Portfolio);
        self.events.emit_field(EntryField::TransactionCurrency);
        self.revalidate();
    }

    /// `None` selects the deliver-without-cash-account mode.
    pub fn set_account(&mut self, account: Option<Account>) {
        self.account = account;
        self.events.emit_field(EntryField::Account);
        self.events.emit_field(EntryField::TransactionCurrency);
        self.revalidate();
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
        self.events.emit_field(EntryField::Amount);
        self.revalidate();
    }

    pub fn set_fees(&mut self, fees: Amount) {
        self.fees = fees;
        self.events.emit_field(EntryField::Fees);
        self.revalidate();
    }

    pub fn set_interval_months(&mut self, interval_months: u32) {
        self.interval_months = interval_months.max(1);
        self.events.emit_field(EntryField::Interval);
        self.revalidate();
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = start_date;
        self.events.emit_field(EntryField::StartDate);
        self.revalidate();
    }

    pub fn set_auto_generate(&mut self, auto_generate: bool) {
        self.auto_generate = auto_generate;
        self.events.emit_field(EntryField::AutoGenerate);
        self.revalidate();
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seeds the model from a persisted plan. Selections are expected to be
    /// in place.
    pub fn load_source(&mut self, plan: &Plan) {
        self.source_plan_id = Some(plan.id.clone());
        self.name = plan.name.clone();
        self.amount = plan.amount.value();
        self.fees = plan.fees.value();
        self.interval_months = plan.interval_months;
        self.start_date = plan.start_date;
        self.auto_generate = plan.auto_generate;
        for field in [
            EntryField::Name,
            EntryField::Amount,
            EntryField::Fees,
            EntryField::Interval,
            EntryField::StartDate,
            EntryField::AutoGenerate,
        ] {
            self.events.emit_field(field);
        }
        self.revalidate();
    }

    /// Clears the source reference and zeroes the amounts while keeping
    /// selections and dates.
    pub fn reset_to_new(&mut self) {
        self.source_plan_id = None;
        self.name = String::new();
        self.amount = Amount::ZERO;
        self.fees = Amount::ZERO;
        self.events.emit_field(EntryField::Name);
        self.events.emit_field(EntryField::Amount);
        self.events.emit_field(EntryField::Fees);
        self.revalidate();
    }

    /// Writes the plan: updated in place while editing, inserted otherwise.
    /// Plans do not move between owners.
    pub fn apply_changes(&mut self, store: &mut dyn TransactionStoreTrait) -> Result<Plan> {
        if !self.status.is_ok() {
            return Err(Error::ContractViolation(format!(
                "apply_changes on a non-valid model: {:?}",
                self.status
            )));
        }
        let security = self.security.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a security".to_string())
        })?;
        let portfolio = self.portfolio.as_ref().ok_or_else(|| {
            Error::ContractViolation("apply_changes without a portfolio".to_string())
        })?;
        let currency = self.plan_currency().to_string();

        let plan = Plan {
            id: self
                .source_plan_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name.clone(),
            security_id: security.id.clone(),
            portfolio_id: portfolio.id.clone(),
            account_id: self.account.as_ref().map(|a| a.id.clone()),
            amount: MonetaryAmount::new(currency.clone(), self.amount),
            fees: MonetaryAmount::new(currency, self.fees),
            interval_months: self.interval_months,
            start_date: self.start_date,
            auto_generate: self.auto_generate,
        };

        if self.source_plan_id.is_some() {
            log::debug!("updating plan {} in place", plan.id);
            store.replace_plan(plan.clone()).map_err(Error::Domain)?;
        } else {
            log::debug!("inserting new plan {}", plan.id);
            store.add_plan(plan.clone()).map_err(Error::Domain)?;
            self.source_plan_id = Some(plan.id.clone());
        }
        Ok(plan)
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
        if self.name.trim().is_empty() {
            return Some(ValidationIssue::MissingSelection("name".to_string()));
        }
        if self.security.is_none() {
            return Some(ValidationIssue::MissingSelection("security".to_string()));
        }
        if self.portfolio.is_none() {
            return Some(ValidationIssue::MissingSelection("portfolio".to_string()));
        }
        if self.fees.is_negative() {
            return Some(ValidationIssue::ToleranceViolation("fees".to_string()));
        }
        if self.amount.is_zero() || self.amount.is_negative() {
            return Some(ValidationIssue::ZeroMandatoryAmount("amount".to_string()));
        }
        None
    }
}
