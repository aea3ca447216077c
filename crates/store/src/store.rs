//! The store interface consumed by the engine.
//!
//! Implementations must execute `materialize_occurrence` and
//! `delete_and_reconcile` as single atomic units: all of the writes commit
//! or none do, and concurrent balance adjustments against the same account
//! serialize without lost updates. That is a requirement of the interface,
//! not an incidental property of any one backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moneta_core::ledger::{Account, Transaction, UserProfile};
use moneta_core::reports::MonthWindow;
use moneta_shared::types::{AccountId, TransactionId, UserId};

use crate::error::StoreError;

/// Result of an atomic materialization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// A new ledger entry was created.
    Created(TransactionId),
    /// The template was no longer due inside the atomic unit; nothing was
    /// written. Duplicate deliveries land here.
    AlreadyProcessed,
}

/// Point lookups, range scans, and the two atomic ledger mutations.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetches a transaction by id, scoped to its owning user.
    async fn transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError>;

    /// Fetches an account by id.
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// All recurring templates with status Completed that are due at `now`:
    /// never processed, or next occurrence date reached.
    async fn due_templates(&self, now: DateTime<Utc>) -> Result<Vec<Transaction>, StoreError>;

    /// A user's transactions whose occurrence date falls inside `window`.
    async fn transactions_in_window(
        &self,
        user_id: UserId,
        window: MonthWindow,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// All report recipients.
    async fn users(&self) -> Result<Vec<UserProfile>, StoreError>;

    /// Atomically materializes one due template: inserts the derived
    /// non-recurring entry, applies the signed balance delta to the
    /// template's account, and advances `last_processed` /
    /// `next_recurring_date`.
    ///
    /// Due-ness is re-checked inside the atomic unit (compare-and-swap on
    /// `last_processed`), so a duplicate or racing delivery returns
    /// [`MaterializeOutcome::AlreadyProcessed`] instead of writing twice.
    async fn materialize_occurrence(
        &self,
        user_id: UserId,
        template_id: TransactionId,
        now: DateTime<Utc>,
    ) -> Result<MaterializeOutcome, StoreError>;

    /// Atomically deletes the given transactions and applies one coalesced
    /// reversal delta per distinct account touched. Duplicate ids collapse
    /// to a single reference; each row is reversed exactly once.
    ///
    /// Fails entirely - no deletion, no balance change - if any id does not
    /// resolve to a transaction owned by `user_id`.
    async fn delete_and_reconcile(
        &self,
        user_id: UserId,
        ids: &[TransactionId],
    ) -> Result<(), StoreError>;
}
