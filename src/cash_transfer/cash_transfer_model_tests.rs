//! Tests for the account transfer entry model.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::cash_transfer::CashTransferModel;
    use crate::domain::{
        Account, MemoryTransactionStore, OwnerRef, TransactionKind,
    };
    use crate::editor::EntryDefaults;
    use crate::fx::{NoRatesProvider, StaticRateProvider};
    use crate::money::{Amount, MonetaryAmount};
    use crate::validation::ValidationIssue;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn defaults() -> EntryDefaults {
        EntryDefaults::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        )
    }

    fn eur_account(id: &str) -> Account {
        Account::new(id, format!("Account {}", id), "EUR")
    }

    fn usd_account(id: &str) -> Account {
        Account::new(id, format!("Account {}", id), "USD")
    }

    fn same_currency_transfer() -> CashTransferModel {
        let mut model = CashTransferModel::new(&defaults(), Arc::new(NoRatesProvider));
        model.set_source_account(Some(eur_account("acc-1")));
        model.set_target_account(Some(eur_account("acc-2")));
        model
    }

    fn cross_currency_transfer() -> CashTransferModel {
        let mut provider = StaticRateProvider::new();
        provider.insert(
            "EUR",
            "USD",
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            dec!(1.10),
        );
        let mut model = CashTransferModel::new(&defaults(), Arc::new(provider));
        model.set_source_account(Some(eur_account("acc-1")));
        model.set_target_account(Some(usd_account("acc-usd")));
        model
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_source_and_target_must_differ() {
        let mut model = CashTransferModel::new(&defaults(), Arc::new(NoRatesProvider));
        model.set_source_account(Some(eur_account("acc-1")));
        model.set_target_account(Some(eur_account("acc-1")));
        model.set_amount(Amount::new(10_000));

        assert_eq!(
            model.status().issue(),
            Some(&ValidationIssue::DuplicateEndpoints("accounts".to_string()))
        );

        model.set_target_account(Some(eur_account("acc-2")));
        assert!(model.status().is_ok());
    }

    #[test]
    fn test_amount_is_mandatory() {
        let model = same_currency_transfer();
        assert_eq!(
            model.status().issue(),
            Some(&ValidationIssue::ZeroMandatoryAmount("amount".to_string()))
        );
    }

    // ========================================================================
    // Propagation
    // ========================================================================

    #[test]
    fn test_same_currency_mirrors_the_amount() {
        let mut model = same_currency_transfer();
        model.set_amount(Amount::new(10_000));

        assert_eq!(model.exchange_rate(), dec!(1));
        assert_eq!(model.target_amount(), Amount::new(10_000));
        assert!(model.status().is_ok());
    }

    #[test]
    fn test_cross_currency_converts_the_amount() {
        let mut model = cross_currency_transfer();
        assert_eq!(model.exchange_rate(), dec!(1.10));

        model.set_amount(Amount::new(10_000)); // 100.00 EUR
        assert_eq!(model.target_amount(), Amount::new(11_000)); // 110.00 USD
        assert!(model.status().is_ok());
    }

    #[test]
    fn test_setting_the_target_amount_back_solves_the_rate() {
        let mut model = cross_currency_transfer();
        model.set_amount(Amount::new(10_000));
        model.set_target_amount(Amount::new(11_200));

        assert_eq!(model.amount(), Amount::new(10_000));
        assert_eq!(model.exchange_rate(), dec!(1.12));
        assert!(model.status().is_ok());
    }

    #[test]
    fn test_setting_the_target_amount_without_a_source_amount_back_solves_it() {
        let mut model = cross_currency_transfer();
        model.set_target_amount(Amount::new(11_000));

        // rate 1.10 known, source amount derived
        assert_eq!(model.amount(), Amount::new(10_000));
    }

    // ========================================================================
    // Apply - paired legs
    // ========================================================================

    #[test]
    fn test_same_currency_apply_writes_mirrored_legs_without_units() {
        let mut model = same_currency_transfer();
        model.set_amount(Amount::new(10_000));

        let mut store = MemoryTransactionStore::new();
        let (outbound, inbound) = model.apply_changes(&mut store).unwrap();

        assert_eq!(outbound.kind, TransactionKind::TransferOut);
        assert_eq!(inbound.kind, TransactionKind::TransferIn);
        assert_eq!(outbound.amount, MonetaryAmount::new("EUR", Amount::new(10_000)));
        assert_eq!(inbound.amount, MonetaryAmount::new("EUR", Amount::new(10_000)));
        assert!(outbound.units.is_empty());
        assert!(inbound.units.is_empty());
        assert_eq!(outbound.transfer_id, inbound.transfer_id);
    }

    #[test]
    fn test_cross_currency_apply_attaches_the_forex_unit_to_the_source_leg() {
        let mut model = cross_currency_transfer();
        model.set_amount(Amount::new(10_000));

        let mut store = MemoryTransactionStore::new();
        let (outbound, inbound) = model.apply_changes(&mut store).unwrap();

        let gross = outbound.gross_value_unit().unwrap();
        assert_eq!(
            gross.amount(),
            &MonetaryAmount::new("EUR", Amount::new(10_000))
        );
        assert_eq!(
            gross.forex().unwrap().amount,
            MonetaryAmount::new("USD", Amount::new(11_000))
        );
        // the unit rate converts the foreign amount back into the source
        // currency - the inverse of the editing rate
        assert_eq!(gross.forex().unwrap().rate, dec!(0.9090909091));
        assert!(inbound.gross_value_unit().is_none());
    }

    #[test]
    fn test_switching_the_target_currency_mid_edit() {
        // start EUR -> EUR, then retarget to a USD account
        let mut provider = StaticRateProvider::new();
        provider.insert(
            "EUR",
            "USD",
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            dec!(1.10),
        );
        let mut model = CashTransferModel::new(&defaults(), Arc::new(provider));
        model.set_source_account(Some(eur_account("acc-1")));
        model.set_target_account(Some(eur_account("acc-2")));
        model.set_amount(Amount::new(10_000));
        assert_eq!(model.target_amount(), Amount::new(10_000));

        model.set_target_account(Some(usd_account("acc-usd")));
        assert_eq!(model.exchange_rate(), dec!(1.10));
        assert_eq!(model.target_amount(), Amount::new(11_000));

        let mut store = MemoryTransactionStore::new();
        let (outbound, _) = model.apply_changes(&mut store).unwrap();
        assert!(outbound.gross_value_unit().is_some());
    }

    #[test]
    fn test_in_place_update_keeps_both_leg_ids() {
        let mut model = same_currency_transfer();
        model.set_amount(Amount::new(10_000));

        let mut store = MemoryTransactionStore::new();
        let (first_out, first_in) = model.apply_changes(&mut store).unwrap();

        model.set_amount(Amount::new(20_000));
        let (second_out, second_in) = model.apply_changes(&mut store).unwrap();

        assert_eq!(first_out.id, second_out.id);
        assert_eq!(first_in.id, second_in.id);
        let owner = OwnerRef::Account("acc-1".to_string());
        assert_eq!(store.transactions_of(&owner).len(), 1);
    }

    #[test]
    fn test_changing_a_leg_owner_recreates_the_pair() {
        let mut model = same_currency_transfer();
        model.set_amount(Amount::new(10_000));

        let mut store = MemoryTransactionStore::new();
        let (first_out, first_in) = model.apply_changes(&mut store).unwrap();

        model.set_target_account(Some(eur_account("acc-3")));
        let (second_out, second_in) = model.apply_changes(&mut store).unwrap();

        // both legs were deleted and recreated, nothing dangles
        assert!(store
            .transactions_of(&OwnerRef::Account("acc-2".to_string()))
            .is_empty());
        assert_eq!(
            store
                .transactions_of(&OwnerRef::Account("acc-1".to_string()))
                .len(),
            1
        );
        assert_eq!(
            store
                .transactions_of(&OwnerRef::Account("acc-3".to_string()))
                .len(),
            1
        );
        assert_ne!(first_out.id, second_out.id);
        assert_ne!(first_in.id, second_in.id);
        // the pair keeps its linking id across the recreation
        assert_eq!(first_out.transfer_id, second_out.transfer_id);
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    #[test]
    fn test_seeding_recovers_amounts_and_rate_from_both_legs() {
        let mut model = cross_currency_transfer();
        model.set_amount(Amount::new(10_000));

        let mut store = MemoryTransactionStore::new();
        let (outbound, inbound) = model.apply_changes(&mut store).unwrap();

        let mut reloaded = CashTransferModel::new(&defaults(), Arc::new(NoRatesProvider));
        reloaded.set_source_account(Some(eur_account("acc-1")));
        reloaded.set_target_account(Some(usd_account("acc-usd")));
        reloaded.load_source(
            &outbound,
            &inbound,
            OwnerRef::Account("acc-1".to_string()),
            OwnerRef::Account("acc-usd".to_string()),
        );

        assert_eq!(reloaded.amount(), Amount::new(10_000));
        assert_eq!(reloaded.target_amount(), Amount::new(11_000));
        assert_eq!(reloaded.exchange_rate(), dec!(1.10));
        assert!(reloaded.status().is_ok());
    }
}
