use thiserror::Error;

/// Custom error type for monetary value operations
#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("Amount out of range: {0}")]
    Overflow(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    #[error("Negative amount not allowed: {0}")]
    NegativeAmount(String),
}
