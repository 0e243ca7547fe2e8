use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The reasons an editing model can fail validation.
///
/// Issues are ordered by check priority: missing selections are reported
/// before numeric tolerances, tolerances before mandatory totals. The first
/// failing check wins and names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationIssue {
    #[error("required selection '{0}' is missing")]
    MissingSelection(String),

    #[error("calculated value for '{0}' is out of tolerance")]
    ToleranceViolation(String),

    #[error("total does not reconcile with its parts")]
    UnreconciledTotal,

    #[error("'{0}' must not be zero")]
    ZeroMandatoryAmount(String),

    #[error("source and target {0} must differ")]
    DuplicateEndpoints(String),
}

/// The validation state of an editing model, recomputed after every
/// mutation. Hosts gate confirmation on this; it is state, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationStatus {
    #[default]
    Ok,
    Error { issue: ValidationIssue },
}

impl ValidationStatus {
    pub fn error(issue: ValidationIssue) -> Self {
        ValidationStatus::Error { issue }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationStatus::Ok)
    }

    pub fn issue(&self) -> Option<&ValidationIssue> {
        match self {
            ValidationStatus::Ok => None,
            ValidationStatus::Error { issue } => Some(issue),
        }
    }
}
