use thiserror::Error;

use crate::store::StoreError;

/// Failure taxonomy for every engine operation. `RuleViolation` and
/// `AccessDenied` are caller logic errors and must never be retried;
/// `Internal` is the only retryable class.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Rule violation: {0}")]
    RuleViolation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable machine-readable code for callers that map engine results
    /// onto a transport.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Store(StoreError::NotFound(_)) | EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::Store(StoreError::Duplicate(_)) | EngineError::Conflict(_) => "CONFLICT",
            EngineError::AccessDenied(_) => "ACCESS_DENIED",
            EngineError::RuleViolation(_) => "RULE_VIOLATION",
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Internal(_))
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EngineError::Validation(errors.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
