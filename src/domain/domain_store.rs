use std::collections::HashMap;

use crate::domain::{DomainError, OwnerRef, Plan, Transaction, TransactionStoreTrait};

/// In-memory implementation of [`TransactionStoreTrait`].
///
/// Used by tests and by hosts that manage persistence elsewhere. Enforces
/// the persisted invariants: amounts are non-negative and ids are unique
/// per owner.
#[derive(Default)]
pub struct MemoryTransactionStore {
    transactions: HashMap<OwnerRef, Vec<Transaction>>,
    plans: HashMap<String, Plan>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All transactions held by the given owner, in insertion order.
    pub fn transactions_of(&self, owner: &OwnerRef) -> &[Transaction] {
        self.transactions.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    fn check_persistable(transaction: &Transaction) -> Result<(), DomainError> {
        if transaction.amount.value().is_negative() {
            return Err(DomainError::NegativeAmount(
                transaction.amount.to_decimal().to_string(),
            ));
        }
        Ok(())
    }
}

impl TransactionStoreTrait for MemoryTransactionStore {
    fn add_transaction(
        &mut self,
        owner: &OwnerRef,
        transaction: Transaction,
    ) -> Result<(), DomainError> {
        Self::check_persistable(&transaction)?;
        let owned = self.transactions.entry(owner.clone()).or_default();
        if owned.iter().any(|tx| tx.id == transaction.id) {
            return Err(DomainError::DuplicateId(transaction.id));
        }
        owned.push(transaction);
        Ok(())
    }

    fn transaction(
        &self,
        owner: &OwnerRef,
        transaction_id: &str,
    ) -> Result<Transaction, DomainError> {
        self.transactions_of(owner)
            .iter()
            .find(|tx| tx.id == transaction_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(transaction_id.to_string()))
    }

    fn replace_transaction(
        &mut self,
        owner: &OwnerRef,
        transaction: Transaction,
    ) -> Result<(), DomainError> {
        Self::check_persistable(&transaction)?;
        let owned = self
            .transactions
            .get_mut(owner)
            .ok_or_else(|| DomainError::NotFound(owner.id().to_string()))?;
        let slot = owned
            .iter_mut()
            .find(|tx| tx.id == transaction.id)
            .ok_or_else(|| DomainError::NotFound(transaction.id.clone()))?;
        *slot = transaction;
        Ok(())
    }

    fn delete_transaction(
        &mut self,
        owner: &OwnerRef,
        transaction_id: &str,
    ) -> Result<(), DomainError> {
        let owned = self
            .transactions
            .get_mut(owner)
            .ok_or_else(|| DomainError::NotFound(owner.id().to_string()))?;
        let before = owned.len();
        owned.retain(|tx| tx.id != transaction_id);
        if owned.len() == before {
            return Err(DomainError::NotFound(transaction_id.to_string()));
        }
        Ok(())
    }

    fn add_plan(&mut self, plan: Plan) -> Result<(), DomainError> {
        if self.plans.contains_key(&plan.id) {
            return Err(DomainError::DuplicateId(plan.id));
        }
        self.plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    fn plan(&self, plan_id: &str) -> Result<Plan, DomainError> {
        self.plans
            .get(plan_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(plan_id.to_string()))
    }

    fn replace_plan(&mut self, plan: Plan) -> Result<(), DomainError> {
        match self.plans.get_mut(&plan.id) {
            Some(slot) => {
                *slot = plan;
                Ok(())
            }
            None => Err(DomainError::NotFound(plan.id)),
        }
    }
}
