//! In-memory reference implementation of [`LedgerStore`].
//!
//! A single `tokio::sync::Mutex` over the whole state makes every operation
//! an atomic unit for free and serializes concurrent balance adjustments
//! against the same account. This is the backend used by the dev runner and
//! the test suites; production deployments plug a relational store into the
//! same trait.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moneta_core::ledger::{
    plan_materialization, reconcile_deltas, Account, Transaction, UserProfile,
};
use moneta_core::reports::MonthWindow;
use moneta_shared::types::{AccountId, TransactionId, UserId};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{LedgerStore, MaterializeOutcome};

#[derive(Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    transactions: BTreeMap<TransactionId, Transaction>,
    users: Vec<UserProfile>,
}

/// In-memory ledger store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a report recipient.
    pub async fn insert_user(&self, user: UserProfile) {
        self.state.lock().await.users.push(user);
    }

    /// Adds an account.
    pub async fn insert_account(&self, account: Account) {
        self.state.lock().await.accounts.insert(account.id, account);
    }

    /// Adds a transaction row (plain history or recurring template).
    pub async fn insert_transaction(&self, transaction: Transaction) {
        self.state
            .lock()
            .await
            .transactions
            .insert(transaction.id, transaction);
    }

    /// Current balance of an account, if it exists.
    pub async fn balance(&self, account_id: AccountId) -> Option<Decimal> {
        self.state
            .lock()
            .await
            .accounts
            .get(&account_id)
            .map(|account| account.balance)
    }

    /// Total number of transaction rows.
    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .get(&id)
            .filter(|tx| tx.user_id == user_id)
            .cloned())
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn due_templates(&self, now: DateTime<Utc>) -> Result<Vec<Transaction>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .values()
            .filter(|tx| {
                tx.is_recurring
                    && tx.status == moneta_core::ledger::TransactionStatus::Completed
                    && tx.is_due(now)
            })
            .cloned()
            .collect())
    }

    async fn transactions_in_window(
        &self,
        user_id: UserId,
        window: MonthWindow,
    ) -> Result<Vec<Transaction>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .values()
            .filter(|tx| tx.user_id == user_id && window.contains(tx.date))
            .cloned()
            .collect())
    }

    async fn users(&self) -> Result<Vec<UserProfile>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.clone())
    }

    async fn materialize_occurrence(
        &self,
        user_id: UserId,
        template_id: TransactionId,
        now: DateTime<Utc>,
    ) -> Result<MaterializeOutcome, StoreError> {
        // The lock is the atomic unit: plan and apply happen against the same
        // snapshot, so the due re-check here is the duplicate-delivery guard.
        let mut state = self.state.lock().await;

        let template = state
            .transactions
            .get(&template_id)
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("template {template_id}")))?;

        if !template.is_due(now) {
            return Ok(MaterializeOutcome::AlreadyProcessed);
        }

        let plan = plan_materialization(&template, now)?;

        // Compare-and-swap on last_processed. Vacuous under this lock, but
        // part of the contract every backend must honor.
        if plan.observed_last_processed != template.last_processed {
            return Ok(MaterializeOutcome::AlreadyProcessed);
        }

        if !state.accounts.contains_key(&plan.account_id) {
            return Err(StoreError::MissingAccount(plan.account_id));
        }

        // Insert, then balance, then advance.
        let entry_id = plan.entry.id;
        state.transactions.insert(entry_id, plan.entry);
        if let Some(account) = state.accounts.get_mut(&plan.account_id) {
            account.balance += plan.balance_delta;
        }
        if let Some(row) = state.transactions.get_mut(&plan.template_id) {
            row.last_processed = Some(plan.last_processed);
            row.next_recurring_date = Some(plan.next_recurring_date);
        }

        Ok(MaterializeOutcome::Created(entry_id))
    }

    async fn delete_and_reconcile(
        &self,
        user_id: UserId,
        ids: &[TransactionId],
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        // Duplicate ids collapse to one reference: each row is reversed
        // exactly once no matter how often it appears in the request.
        let ids: BTreeSet<TransactionId> = ids.iter().copied().collect();

        // Validate everything before touching anything: an unknown id counts
        // as not owned by the requesting user.
        let mut rows = Vec::with_capacity(ids.len());
        for id in &ids {
            match state.transactions.get(id) {
                Some(tx) if tx.user_id == user_id => rows.push(tx.clone()),
                _ => {
                    return Err(StoreError::Ownership {
                        user_id,
                        transaction_id: *id,
                    })
                }
            }
        }

        let deltas = reconcile_deltas(&rows);
        for account_id in deltas.keys() {
            if !state.accounts.contains_key(account_id) {
                return Err(StoreError::MissingAccount(*account_id));
            }
        }

        for id in &ids {
            state.transactions.remove(id);
        }
        for (account_id, delta) in deltas {
            if let Some(account) = state.accounts.get_mut(&account_id) {
                account.balance += delta;
            }
        }

        Ok(())
    }
}
