//! Persisted domain model - transactions, annotation units, owners.
//!
//! The editing models in this crate compute values; the types here are what
//! those values reconcile onto. Storage itself stays behind
//! [`TransactionStoreTrait`], the way hosts plug in their own persistence.

mod domain_errors;
mod domain_model;
mod domain_store;
mod domain_traits;

#[cfg(test)]
mod domain_model_tests;

pub use domain_errors::DomainError;
pub use domain_model::{
    Account, ForexPair, OwnerRef, Plan, Portfolio, Security, SignPolicy, SourceRef, Transaction,
    TransactionKind, TransactionUnit, TransferSourceRef, UnitKind,
};
pub use domain_store::MemoryTransactionStore;
pub use domain_traits::TransactionStoreTrait;
