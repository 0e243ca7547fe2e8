//! Validation status types and shared tolerance checks.

mod validation_checks;
mod validation_model;

#[cfg(test)]
mod validation_tests;

pub use validation_checks::{conversion_consistent, quote_consistent};
pub use validation_model::{ValidationIssue, ValidationStatus};
