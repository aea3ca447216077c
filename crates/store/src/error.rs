//! Error types for store operations.

use moneta_core::ledger::LedgerError;
use moneta_shared::types::{AccountId, TransactionId, UserId};
use moneta_shared::AppError;
use thiserror::Error;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A mutation references an account that does not exist. Unlike a
    /// vanished template this is an integrity defect, never a routine skip.
    #[error("Account {0} is missing for a balance adjustment")]
    MissingAccount(AccountId),

    /// A transaction in the request does not belong to the requesting user.
    #[error("Transaction {transaction_id} does not belong to user {user_id}")]
    Ownership {
        /// The requesting user.
        user_id: UserId,
        /// The offending transaction.
        transaction_id: TransactionId,
    },

    /// The template failed mutation-planning validation.
    #[error(transparent)]
    InvalidTemplate(#[from] LedgerError),

    /// The backend could not commit the atomic unit. Retryable; by
    /// construction no partial state was written.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if the external job engine should retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::MissingAccount(_) => Self::Internal(err.to_string()),
            StoreError::Ownership { .. } | StoreError::InvalidTemplate(_) => {
                Self::BusinessRule(err.to_string())
            }
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}
