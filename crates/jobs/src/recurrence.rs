//! Recurring-transaction due scan and throttled processor.
//!
//! The daily scan is read-only: it finds due templates and fans them out as
//! one work item each. The processor consumes items one at a time,
//! re-validates due-ness against the store (items may be stale or duplicated
//! under at-least-once delivery), and hands the actual writes to the store's
//! atomic materialization.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use moneta_shared::types::{TransactionId, UserId};
use moneta_shared::AppError;
use moneta_store::{LedgerStore, MaterializeOutcome, StoreError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{KeyedThrottle, RecurrenceWorkItem};

/// Errors surfaced to the external job engine.
#[derive(Debug, Error)]
pub enum JobError {
    /// The work item is missing required data. A defect, never retried.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// The store failed; retryable when the store says so.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The work-item queue hung up before the scan finished fanning out.
    #[error("Work queue closed")]
    QueueClosed,
}

impl JobError {
    /// Whether the job engine should retry the work item.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_retryable(),
            Self::ContractViolation(_) | Self::QueueClosed => false,
        }
    }
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::ContractViolation(msg) => Self::ContractViolation(msg),
            JobError::Store(store) => store.into(),
            JobError::QueueClosed => Self::Internal(err.to_string()),
        }
    }
}

/// How a successfully handled work item was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// A new ledger entry was created.
    Materialized(TransactionId),
    /// Nothing to do; duplicate deliveries and vanished templates land here.
    Skipped(SkipReason),
}

/// Why a work item was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The template no longer exists for this user.
    TemplateMissing,
    /// The template has already been processed for this cycle.
    NotDue,
}

/// Finds due templates and builds one work item per match. Read-only.
pub async fn scan_due_templates<S: LedgerStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<Vec<RecurrenceWorkItem>, JobError> {
    let due = store.due_templates(now).await?;
    Ok(due
        .into_iter()
        .map(|template| RecurrenceWorkItem::new(template.id, template.user_id))
        .collect())
}

/// Daily scheduled entry point: scans for due templates and enqueues one
/// work item each. Returns the number of items triggered.
pub async fn run_due_scan<S: LedgerStore>(
    store: &S,
    queue: &mpsc::Sender<RecurrenceWorkItem>,
    now: DateTime<Utc>,
) -> Result<usize, JobError> {
    let items = scan_due_templates(store, now).await?;
    let triggered = items.len();
    for item in items {
        queue.send(item).await.map_err(|_| JobError::QueueClosed)?;
    }
    info!(triggered, "recurrence due scan complete");
    Ok(triggered)
}

fn validate(item: &RecurrenceWorkItem) -> Result<(TransactionId, UserId), JobError> {
    match (item.transaction_id, item.user_id) {
        (Some(transaction_id), Some(user_id)) => Ok((transaction_id, user_id)),
        _ => Err(JobError::ContractViolation(
            "work item requires transactionId and userId".to_string(),
        )),
    }
}

/// Handles one work item.
///
/// Re-entrant safe: the item may be stale or duplicated, so the template is
/// re-fetched and its due-ness re-checked before any write. A missing or
/// already-handled template is success, not an error. Contract violations
/// are reported without contacting the store.
pub async fn process_work_item<S: LedgerStore>(
    store: &S,
    item: &RecurrenceWorkItem,
    now: DateTime<Utc>,
) -> Result<JobOutcome, JobError> {
    let (transaction_id, user_id) = validate(item)?;

    let Some(template) = store.transaction(user_id, transaction_id).await? else {
        return Ok(JobOutcome::Skipped(SkipReason::TemplateMissing));
    };
    if !template.is_due(now) {
        return Ok(JobOutcome::Skipped(SkipReason::NotDue));
    }

    match store.materialize_occurrence(user_id, transaction_id, now).await {
        Ok(MaterializeOutcome::Created(entry_id)) => Ok(JobOutcome::Materialized(entry_id)),
        // Another delivery won the race inside the atomic unit.
        Ok(MaterializeOutcome::AlreadyProcessed) => Ok(JobOutcome::Skipped(SkipReason::NotDue)),
        Err(StoreError::NotFound(_)) => Ok(JobOutcome::Skipped(SkipReason::TemplateMissing)),
        // MissingAccount is an integrity defect and surfaces as an error.
        Err(err) => Err(err.into()),
    }
}

/// Per-item counters for one worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Items that created a ledger entry.
    pub materialized: usize,
    /// Items resolved as no-ops.
    pub skipped: usize,
    /// Items that failed and were left to the job engine's retry policy.
    pub failed: usize,
}

/// Queue consumer applying the per-user throttle to each work item.
pub struct RecurrenceWorker<S> {
    store: Arc<S>,
    throttle: KeyedThrottle,
}

impl<S: LedgerStore> RecurrenceWorker<S> {
    /// Creates a worker over the given store and throttle.
    #[must_use]
    pub fn new(store: Arc<S>, throttle: KeyedThrottle) -> Self {
        Self { store, throttle }
    }

    /// Consumes work items until every producer hangs up.
    ///
    /// Per-item failures are logged and counted; they never stop the loop,
    /// and no ordering is guaranteed between items.
    pub async fn run(&self, mut items: mpsc::Receiver<RecurrenceWorkItem>) -> WorkerSummary {
        let mut summary = WorkerSummary::default();

        while let Some(item) = items.recv().await {
            if let Some(user_id) = item.user_id {
                self.throttle.acquire(user_id).await;
            }

            match process_work_item(self.store.as_ref(), &item, Utc::now()).await {
                Ok(JobOutcome::Materialized(entry_id)) => {
                    info!(%entry_id, "materialized recurring occurrence");
                    summary.materialized += 1;
                }
                Ok(JobOutcome::Skipped(reason)) => {
                    debug!(?reason, "work item skipped");
                    summary.skipped += 1;
                }
                Err(err) if err.is_retryable() => {
                    warn!(error = %err, "work item failed, eligible for retry");
                    summary.failed += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    let code = AppError::from(err).error_code();
                    error!(code, error = %message, "work item rejected as a defect");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
