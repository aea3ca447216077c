//! Application-wide error types.
//!
//! The variants mirror how the job engine treats each failure: contract
//! violations are defects and are never retried, missing/already-handled
//! records are not errors at all (callers map them to no-ops before reaching
//! this type), store write failures are retryable, and external service
//! failures are scoped to the step that made the call.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// A work item or request is missing required data. Not retried.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// The store could not commit an atomic unit. Retryable.
    #[error("Store error: {0}")]
    Store(String),

    /// External collaborator (insight generator, email dispatcher) failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true if the external job engine should retry the work item.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::ExternalService(_))
    }

    /// Returns the error code for structured logging.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ContractViolation(_) => "CONTRACT_VIOLATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Store(_) => "STORE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
