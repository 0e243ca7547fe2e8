//! Core error types for the transaction-editing engine.
//!
//! Validation problems are *state*, not errors: they surface through
//! `validation::ValidationStatus` and are never returned as `Err` while the
//! user is editing. The `Error` type below covers genuine misuse - applying a
//! model whose status is not Ok, money arithmetic across currencies, and
//! store lookups that cannot succeed.

use thiserror::Error;

use crate::domain::DomainError;
use crate::money::MoneyError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Money arithmetic failed: {0}")]
    Money(#[from] MoneyError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Applying a model that does not validate is a caller bug; hosts are
    /// expected to gate confirmation on the validation status first.
    #[error("Contract violation: {0}")]
    ContractViolation(String),
}
