//! Monthly report aggregation and dispatch.
//!
//! Runs once per calendar month over the *previous* month. Every user is
//! processed independently: one user's failure is logged and counted, never
//! propagated to the others. Only a failure to list the recipients at all
//! fails the whole run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moneta_core::ledger::UserProfile;
use moneta_core::reports::{MonthWindow, MonthlyReport, ReportService};
use moneta_shared::email::{EmailError, EmailService};
use moneta_store::{LedgerStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::insights::{financial_insights, InsightGenerator};

/// Report delivery errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The delivery channel rejected the report.
    #[error("Failed to deliver report: {0}")]
    Delivery(String),
}

impl From<EmailError> for DispatchError {
    fn from(err: EmailError) -> Self {
        Self::Delivery(err.to_string())
    }
}

/// Delivery channel for assembled monthly reports.
#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    /// Delivers one report to one recipient.
    async fn send(
        &self,
        recipient: &UserProfile,
        report: &MonthlyReport,
    ) -> Result<(), DispatchError>;
}

/// Dispatches reports as plain-text email.
pub struct EmailReportDispatcher {
    email: EmailService,
}

impl EmailReportDispatcher {
    /// Creates a dispatcher over the given email service.
    #[must_use]
    pub const fn new(email: EmailService) -> Self {
        Self { email }
    }

    fn body(recipient: &UserProfile, report: &MonthlyReport) -> String {
        let categories = report
            .stats
            .by_category
            .iter()
            .map(|(category, amount)| format!("  - {category}: {amount}"))
            .collect::<Vec<_>>()
            .join("\n");
        let insights = report
            .insights
            .iter()
            .map(|line| format!("  - {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Hi {name},\n\n\
             Here is your financial summary for {month}:\n\n\
             Income: {income}\n\
             Expenses: {expenses}\n\
             Net: {net}\n\n\
             Spending by category:\n{categories}\n\n\
             Insights:\n{insights}\n\n\
             Best regards,\n\
             The Moneta Team",
            name = recipient.name,
            month = report.month_label,
            income = report.stats.total_income,
            expenses = report.stats.total_expenses,
            net = report.stats.net(),
            categories = if categories.is_empty() {
                "  (no categorized expenses)".to_string()
            } else {
                categories
            },
        )
    }
}

#[async_trait]
impl ReportDispatcher for EmailReportDispatcher {
    async fn send(
        &self,
        recipient: &UserProfile,
        report: &MonthlyReport,
    ) -> Result<(), DispatchError> {
        let subject = format!("Your Monthly Financial Report - {}", report.month_label);
        let body = Self::body(recipient, report);
        self.email
            .send_email(&recipient.email, &subject, &body)
            .await?;
        Ok(())
    }
}

/// Outcome counts of one monthly report run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportRunSummary {
    /// Reports assembled and delivered.
    pub processed: usize,
    /// Users whose report failed; each failure was logged and skipped.
    pub failed: usize,
}

/// Assembles and dispatches the previous month's report for every user.
///
/// # Errors
///
/// Returns an error only if the recipient list itself cannot be fetched.
/// Per-user failures are counted in the summary instead.
pub async fn run_monthly_reports<S, G, D>(
    store: &S,
    generator: &G,
    dispatcher: &D,
    now: DateTime<Utc>,
) -> Result<ReportRunSummary, StoreError>
where
    S: LedgerStore,
    G: InsightGenerator,
    D: ReportDispatcher,
{
    let window = MonthWindow::previous_month(now);
    let month_label = window.label();
    let users = store.users().await?;

    info!(month = %month_label, users = users.len(), "monthly report run started");

    let mut summary = ReportRunSummary::default();
    for user in &users {
        match report_for_user(store, generator, dispatcher, user, window, &month_label).await {
            Ok(()) => summary.processed += 1,
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "monthly report failed for user");
                summary.failed += 1;
            }
        }
    }

    info!(
        month = %month_label,
        processed = summary.processed,
        failed = summary.failed,
        "monthly report run finished"
    );
    Ok(summary)
}

async fn report_for_user<S, G, D>(
    store: &S,
    generator: &G,
    dispatcher: &D,
    user: &UserProfile,
    window: MonthWindow,
    month_label: &str,
) -> Result<(), ReportUserError>
where
    S: LedgerStore,
    G: InsightGenerator,
    D: ReportDispatcher,
{
    let transactions = store.transactions_in_window(user.id, window).await?;
    let stats = ReportService::monthly_stats(&transactions);
    let insights = financial_insights(generator, &stats, month_label).await;

    let report = MonthlyReport {
        month_label: month_label.to_string(),
        stats,
        insights,
    };
    dispatcher.send(user, &report).await?;
    Ok(())
}

#[derive(Debug, Error)]
enum ReportUserError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
