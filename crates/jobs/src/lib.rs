//! Scheduled job pipeline for Moneta.
//!
//! The external job engine supplies cron-style triggering, at-least-once
//! delivery, and retries; this crate supplies the work that runs inside
//! those guarantees:
//!
//! - `engine` - the work-item queue between the daily due scan and the
//!   processor, and the per-user rolling-window throttle
//! - `recurrence` - the due scan (read-only fan-out) and the throttled
//!   per-item processor
//! - `insights` - the insight-generator collaborator and its fallback
//! - `report` - the monthly aggregator and report dispatch

pub mod engine;
pub mod insights;
pub mod recurrence;
pub mod report;

pub use engine::{work_queue, KeyedThrottle, RecurrenceWorkItem};
pub use insights::{financial_insights, HttpInsightGenerator, InsightError, InsightGenerator};
pub use recurrence::{
    process_work_item, run_due_scan, scan_due_templates, JobError, JobOutcome, RecurrenceWorker,
    SkipReason, WorkerSummary,
};
pub use report::{
    run_monthly_reports, DispatchError, EmailReportDispatcher, ReportDispatcher, ReportRunSummary,
};
