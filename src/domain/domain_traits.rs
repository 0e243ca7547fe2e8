use crate::domain::{DomainError, OwnerRef, Plan, Transaction};

/// Trait defining the contract for the persisted domain store.
///
/// Creation, deletion and replacement of a transaction are delegated to the
/// owner identified by an [`OwnerRef`]; the editing models never touch
/// storage directly. Implementations are free to persist however they like -
/// [`crate::domain::MemoryTransactionStore`] keeps everything in memory.
pub trait TransactionStoreTrait: Send + Sync {
    fn add_transaction(
        &mut self,
        owner: &OwnerRef,
        transaction: Transaction,
    ) -> Result<(), DomainError>;

    fn transaction(
        &self,
        owner: &OwnerRef,
        transaction_id: &str,
    ) -> Result<Transaction, DomainError>;

    fn replace_transaction(
        &mut self,
        owner: &OwnerRef,
        transaction: Transaction,
    ) -> Result<(), DomainError>;

    fn delete_transaction(
        &mut self,
        owner: &OwnerRef,
        transaction_id: &str,
    ) -> Result<(), DomainError>;

    fn add_plan(&mut self, plan: Plan) -> Result<(), DomainError>;

    fn plan(&self, plan_id: &str) -> Result<Plan, DomainError>;

    fn replace_plan(&mut self, plan: Plan) -> Result<(), DomainError>;
}
