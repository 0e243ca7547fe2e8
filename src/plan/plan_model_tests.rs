//! Tests for the recurring plan entry model.

#[cfg(test)]
mod tests {
    use crate::domain::{
        Account, MemoryTransactionStore, Portfolio, Security, TransactionStoreTrait,
    };
    use crate::editor::EntryDefaults;
    use crate::money::Amount;
    use crate::plan::PlanEntryModel;
    use crate::validation::ValidationIssue;
    use chrono::{NaiveDate, NaiveTime};

    fn defaults() -> EntryDefaults {
        EntryDefaults::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        )
    }

    fn ready_model() -> PlanEntryModel {
        let mut model = PlanEntryModel::new(&defaults());
        model.set_name("Monthly savings plan");
        model.set_security(Some(Security::new("sec-1", "World ETF", "EUR")));
        model.set_portfolio(Some(Portfolio::new("pf-1", "Main", "EUR")));
        model.set_account(Some(Account::new("acc-1", "Broker", "EUR")));
        model.set_amount(Amount::new(20_000));
        model
    }

    #[test]
    fn test_defaults() {
        let model = PlanEntryModel::new(&defaults());
        assert_eq!(model.interval_months(), 1);
        assert_eq!(
            model.start_date(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(!model.auto_generate());
    }

    #[test]
    fn test_name_and_amount_are_mandatory() {
        let mut model = PlanEntryModel::new(&defaults());
        assert_eq!(
            model.status().issue(),
            Some(&ValidationIssue::MissingSelection("name".to_string()))
        );

        model.set_name("Monthly savings plan");
        model.set_security(Some(Security::new("sec-1", "World ETF", "EUR")));
        model.set_portfolio(Some(Portfolio::new("pf-1", "Main", "EUR")));
        assert_eq!(
            model.status().issue(),
            Some(&ValidationIssue::ZeroMandatoryAmount("amount".to_string()))
        );

        model.set_amount(Amount::new(20_000));
        assert!(model.status().is_ok());
    }

    #[test]
    fn test_plan_currency_follows_the_account() {
        let mut model = PlanEntryModel::new(&defaults());
        assert_eq!(model.plan_currency(), "");

        model.set_portfolio(Some(Portfolio::new("pf-1", "Main", "CHF")));
        assert_eq!(model.plan_currency(), "CHF");

        // a linked cash account wins over the portfolio's reference currency
        model.set_account(Some(Account::new("acc-1", "Broker", "EUR")));
        assert_eq!(model.plan_currency(), "EUR");

        // deliver-without-cash-account mode falls back to the portfolio
        model.set_account(None);
        assert_eq!(model.plan_currency(), "CHF");
    }

    #[test]
    fn test_apply_inserts_then_updates_in_place() {
        let mut model = ready_model();
        let mut store = MemoryTransactionStore::new();

        let first = model.apply_changes(&mut store).unwrap();
        assert_eq!(first.name, "Monthly savings plan");
        assert_eq!(first.account_id.as_deref(), Some("acc-1"));
        assert_eq!(first.amount.currency(), "EUR");

        model.set_amount(Amount::new(25_000));
        let second = model.apply_changes(&mut store).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(
            store.plan(&first.id).unwrap().amount.value(),
            Amount::new(25_000)
        );
    }

    #[test]
    fn test_deliver_mode_plan_has_no_account() {
        let mut model = ready_model();
        model.set_account(None);

        let mut store = MemoryTransactionStore::new();
        let plan = model.apply_changes(&mut store).unwrap();

        assert!(plan.account_id.is_none());
        // currency came from the portfolio's reference account
        assert_eq!(plan.amount.currency(), "EUR");
    }

    #[test]
    fn test_seeding_and_reset() {
        let mut model = ready_model();
        let mut store = MemoryTransactionStore::new();
        let plan = model.apply_changes(&mut store).unwrap();

        let mut reloaded = PlanEntryModel::new(&defaults());
        reloaded.set_security(Some(Security::new("sec-1", "World ETF", "EUR")));
        reloaded.set_portfolio(Some(Portfolio::new("pf-1", "Main", "EUR")));
        reloaded.set_account(Some(Account::new("acc-1", "Broker", "EUR")));
        reloaded.load_source(&plan);

        assert_eq!(reloaded.name(), "Monthly savings plan");
        assert_eq!(reloaded.amount(), Amount::new(20_000));
        assert!(reloaded.status().is_ok());

        reloaded.reset_to_new();
        assert!(reloaded.source_plan_id().is_none());
        assert!(reloaded.amount().is_zero());
        assert_eq!(
            reloaded.status().issue(),
            Some(&ValidationIssue::MissingSelection("name".to_string()))
        );
    }
}
