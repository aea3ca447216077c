//! Ledger domain types and balance-safe mutation planning.
//!
//! This module implements the core ledger functionality:
//! - Transactions, recurring templates, and accounts
//! - The signed-amount convention (income adds, expense subtracts)
//! - Materialization planning for due recurring templates
//! - Coalesced balance reconciliation for bulk deletes
//! - Error types for ledger operations

pub mod error;
pub mod mutation;
pub mod types;

#[cfg(test)]
mod mutation_props;

pub use error::LedgerError;
pub use mutation::{plan_materialization, reconcile_deltas, MaterializationPlan};
pub use types::{
    Account, Transaction, TransactionStatus, TransactionType, UserProfile,
};
