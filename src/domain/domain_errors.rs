use thiserror::Error;

/// Custom error type for persisted-domain operations
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Unit amount must not be negative: {0}")]
    NegativeUnitAmount(String),

    #[error("Persisted amount must not be negative: {0}")]
    NegativeAmount(String),

    #[error("Inconsistent unit: {0}")]
    InconsistentUnit(String),
}
