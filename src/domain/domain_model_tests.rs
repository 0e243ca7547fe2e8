//! Tests for the persisted domain model.

#[cfg(test)]
mod tests {
    use crate::domain::{
        DomainError, MemoryTransactionStore, OwnerRef, SignPolicy, Transaction, TransactionKind,
        TransactionStoreTrait, TransactionUnit, UnitKind,
    };
    use crate::money::{Amount, MonetaryAmount};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn test_date() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn eur(minor_units: i64) -> MonetaryAmount {
        MonetaryAmount::new("EUR", Amount::new(minor_units))
    }

    fn usd(minor_units: i64) -> MonetaryAmount {
        MonetaryAmount::new("USD", Amount::new(minor_units))
    }

    // ========================================================================
    // Sign policy formulas
    // ========================================================================

    #[test]
    fn test_acquisition_total_adds_fees_and_taxes() {
        let total = SignPolicy::Acquisition.total_from_parts(
            Amount::new(100_000),
            Amount::new(500),
            Amount::new(250),
        );
        assert_eq!(total, Amount::new(100_750));
    }

    #[test]
    fn test_disposal_total_subtracts_and_floors_at_zero() {
        let policy = SignPolicy::Disposal;
        assert_eq!(
            policy.total_from_parts(Amount::new(100_000), Amount::new(500), Amount::new(250)),
            Amount::new(99_250)
        );
        assert_eq!(
            policy.total_from_parts(Amount::new(100), Amount::new(500), Amount::new(250)),
            Amount::ZERO
        );
    }

    #[test]
    fn test_gross_from_total_inverts_the_formula() {
        let gross = Amount::new(100_000);
        let fees = Amount::new(500);
        let taxes = Amount::new(250);
        for policy in [SignPolicy::Acquisition, SignPolicy::Disposal] {
            let total = policy.total_from_parts(gross, fees, taxes);
            assert_eq!(policy.gross_from_total(total, fees, taxes), gross);
        }
    }

    #[test]
    fn test_acquisition_gross_floors_at_zero() {
        let gross =
            SignPolicy::Acquisition.gross_from_total(Amount::new(100), Amount::new(500), Amount::ZERO);
        assert_eq!(gross, Amount::ZERO);
    }

    // ========================================================================
    // Transaction units
    // ========================================================================

    #[test]
    fn test_fee_unit_rejects_negative_amount() {
        assert!(matches!(
            TransactionUnit::fee(eur(-100)),
            Err(DomainError::NegativeUnitAmount(_))
        ));
    }

    #[test]
    fn test_gross_value_unit_checks_the_pairing() {
        // 900.00 EUR == 1000.00 USD * 0.90
        let unit = TransactionUnit::gross_value(eur(90_000), usd(100_000), dec!(0.90)).unwrap();
        assert_eq!(unit.kind(), UnitKind::GrossValue);
        assert_eq!(unit.forex().unwrap().rate, dec!(0.90));

        // a pairing that is off by more than the tolerance is rejected
        assert!(matches!(
            TransactionUnit::gross_value(eur(95_000), usd(100_000), dec!(0.90)),
            Err(DomainError::InconsistentUnit(_))
        ));
    }

    #[test]
    fn test_gross_value_unit_rejects_zero_rate() {
        assert!(TransactionUnit::gross_value(eur(0), usd(0), dec!(0)).is_err());
    }

    #[test]
    fn test_unit_total_sums_per_kind() {
        let mut tx = Transaction::new(TransactionKind::Buy, test_date(), eur(100_750));
        tx.units = vec![
            TransactionUnit::fee(eur(300)).unwrap(),
            TransactionUnit::fee(eur(200)).unwrap(),
            TransactionUnit::tax(eur(250)).unwrap(),
        ];
        assert_eq!(tx.unit_total(UnitKind::Fee), Amount::new(500));
        assert_eq!(tx.unit_total(UnitKind::Tax), Amount::new(250));
        assert_eq!(tx.unit_total(UnitKind::GrossValue), Amount::ZERO);
    }

    #[test]
    fn test_units_reconcile_with_gross_value_unit() {
        let mut tx = Transaction::new(TransactionKind::Buy, test_date(), eur(90_500));
        tx.units = vec![
            TransactionUnit::fee(eur(500)).unwrap(),
            TransactionUnit::gross_value(eur(90_000), usd(100_000), dec!(0.90)).unwrap(),
        ];
        assert!(tx.units_reconcile());

        // breaking the total breaks reconciliation
        tx.amount = eur(91_000);
        assert!(!tx.units_reconcile());
    }

    #[test]
    fn test_units_reconcile_acquisition_covers_fees() {
        let mut tx = Transaction::new(TransactionKind::Buy, test_date(), eur(400));
        tx.units = vec![TransactionUnit::fee(eur(500)).unwrap()];
        assert!(!tx.units_reconcile());

        tx.amount = eur(600);
        assert!(tx.units_reconcile());
    }

    // ========================================================================
    // Memory store
    // ========================================================================

    #[test]
    fn test_store_add_get_replace_delete() {
        let mut store = MemoryTransactionStore::new();
        let owner = OwnerRef::Account("acc-1".to_string());
        let tx = Transaction::new(TransactionKind::Deposit, test_date(), eur(10_000));
        let id = tx.id.clone();

        store.add_transaction(&owner, tx).unwrap();
        assert_eq!(store.transactions_of(&owner).len(), 1);

        let mut fetched = store.transaction(&owner, &id).unwrap();
        fetched.amount = eur(20_000);
        store.replace_transaction(&owner, fetched).unwrap();
        assert_eq!(store.transaction(&owner, &id).unwrap().amount, eur(20_000));

        store.delete_transaction(&owner, &id).unwrap();
        assert!(matches!(
            store.transaction(&owner, &id),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn test_store_rejects_negative_total() {
        let mut store = MemoryTransactionStore::new();
        let owner = OwnerRef::Account("acc-1".to_string());
        let tx = Transaction::new(TransactionKind::Deposit, test_date(), eur(-1));
        assert!(matches!(
            store.add_transaction(&owner, tx),
            Err(DomainError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_store_rejects_duplicate_id() {
        let mut store = MemoryTransactionStore::new();
        let owner = OwnerRef::Account("acc-1".to_string());
        let tx = Transaction::new(TransactionKind::Deposit, test_date(), eur(10_000));
        let duplicate = tx.clone();
        store.add_transaction(&owner, tx).unwrap();
        assert!(matches!(
            store.add_transaction(&owner, duplicate),
            Err(DomainError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_store_owners_are_distinct() {
        let mut store = MemoryTransactionStore::new();
        let account = OwnerRef::Account("x".to_string());
        let portfolio = OwnerRef::Portfolio("x".to_string());
        let tx = Transaction::new(TransactionKind::Buy, test_date(), eur(10_000));
        let id = tx.id.clone();
        store.add_transaction(&account, tx).unwrap();

        assert!(store.transaction(&portfolio, &id).is_err());
        assert!(store.transaction(&account, &id).is_ok());
    }
}
