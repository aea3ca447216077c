//! Ledger domain types.
//!
//! A `Transaction` is either plain history or, when `is_recurring` is set, a
//! *template* that controls future materializations. Templates are never
//! deleted by the engine; each due cycle produces a new, independent
//! non-recurring row and advances the template's bookkeeping fields.

use chrono::{DateTime, Utc};
use moneta_shared::types::{AccountId, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurringInterval;

/// Direction of a transaction's effect on its account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money in; adds to the account balance.
    Income,
    /// Money out; subtracts from the account balance.
    Expense,
}

/// Lifecycle status of a transaction.
///
/// Only `Completed` templates are eligible for recurrence processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Not yet settled.
    Pending,
    /// Settled and counted.
    Completed,
    /// Cancelled; kept for history only.
    Cancelled,
}

/// A ledger transaction or recurring template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// The account this transaction posts against.
    pub account_id: AccountId,
    /// Income or expense.
    pub transaction_type: TransactionType,
    /// Non-negative magnitude; the sign is derived from `transaction_type`.
    pub amount: Decimal,
    /// Occurrence date (distinct from creation time).
    pub date: DateTime<Utc>,
    /// Free-form category tag.
    pub category: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// True for recurring templates.
    pub is_recurring: bool,
    /// Recurrence interval, required iff `is_recurring`.
    pub recurring_interval: Option<RecurringInterval>,
    /// Instant of the last materialization; `None` means never processed.
    pub last_processed: Option<DateTime<Utc>>,
    /// When the template is next due.
    pub next_recurring_date: Option<DateTime<Utc>>,
}

impl Transaction {
    /// The transaction's effective ledger effect: `+amount` for income,
    /// `-amount` for expense.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Whether a recurring template is due at `now`.
    ///
    /// A template that has never been processed is always due. Otherwise it
    /// is due once its next occurrence date has arrived. A processed
    /// template with no next date is treated as not due rather than looping.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.is_recurring {
            return false;
        }
        if self.last_processed.is_none() {
            return true;
        }
        self.next_recurring_date.is_some_and(|next| next <= now)
    }
}

/// A user's account holding a running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Running balance; always equals the cumulative signed effect of every
    /// transaction committed against this account.
    pub balance: Decimal,
    /// At most one default account per user (enforced by the CRUD layer).
    pub is_default: bool,
}

/// Report recipient. Identity resolution happens outside this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier.
    pub id: UserId,
    /// Delivery address for monthly reports.
    pub email: String,
    /// Display name.
    pub name: String,
}
