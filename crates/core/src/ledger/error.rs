//! Error types for ledger operations.

use moneta_shared::types::TransactionId;
use thiserror::Error;

/// Errors raised while planning ledger mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The transaction is not a recurring template.
    #[error("Transaction {0} is not a recurring template")]
    NotRecurring(TransactionId),

    /// The template is marked recurring but carries no interval.
    #[error("Recurring template {0} has no interval")]
    MissingInterval(TransactionId),
}
