//! Moneta job pipeline dev runner.
//!
//! Seeds an in-memory store with a demo user, account, and recurring
//! templates, then drives one full cycle: due scan, throttled processing,
//! and a monthly report run. In production the scan and the report run are
//! invoked by the external job engine's cron triggers instead.
//!
//! Usage: cargo run --bin scheduler

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moneta_core::ledger::{Account, Transaction, TransactionStatus, TransactionType, UserProfile};
use moneta_core::recurrence::RecurringInterval;
use moneta_core::reports::MonthWindow;
use moneta_jobs::{
    run_due_scan, run_monthly_reports, work_queue, EmailReportDispatcher, HttpInsightGenerator,
    KeyedThrottle, RecurrenceWorker,
};
use moneta_shared::types::{AccountId, TransactionId, UserId};
use moneta_shared::{AppConfig, EmailService};
use moneta_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moneta=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("configuration: {e}"))?;

    let store = Arc::new(MemoryStore::new());
    seed_demo_data(&store).await;

    // One daily cycle: scan fans out, worker drains under the throttle.
    let now = Utc::now();
    let (sender, receiver) = work_queue(config.recurrence.queue_capacity);
    let triggered = run_due_scan(store.as_ref(), &sender, now).await?;
    drop(sender);
    info!(triggered, "due scan enqueued work items");

    let worker = RecurrenceWorker::new(
        Arc::clone(&store),
        KeyedThrottle::from_config(&config.recurrence),
    );
    let summary = worker.run(receiver).await;
    info!(
        materialized = summary.materialized,
        skipped = summary.skipped,
        failed = summary.failed,
        "recurrence cycle finished"
    );

    // One monthly cycle over the previous calendar month. Without an API
    // key the generator fails and the deterministic fallback text is used;
    // without an SMTP listener the dispatch failures are counted, not fatal.
    let generator = HttpInsightGenerator::new(config.insights.clone())
        .map_err(|e| anyhow::anyhow!("insight generator: {e}"))?;
    let dispatcher = EmailReportDispatcher::new(EmailService::new(config.email.clone()));
    let reports = run_monthly_reports(store.as_ref(), &generator, &dispatcher, now).await?;
    info!(
        processed = reports.processed,
        failed = reports.failed,
        "monthly report cycle finished"
    );

    Ok(())
}

/// Seeds one demo user with an account, two due recurring templates, and a
/// month of plain history for the report run.
async fn seed_demo_data(store: &MemoryStore) {
    let user_id = UserId::new();
    let account_id = AccountId::new();

    store
        .insert_user(UserProfile {
            id: user_id,
            email: "demo@moneta.local".to_string(),
            name: "Demo User".to_string(),
        })
        .await;

    store
        .insert_account(Account {
            id: account_id,
            user_id,
            name: "Checking".to_string(),
            balance: dec!(5000),
            is_default: true,
        })
        .await;

    let now = Utc::now();
    // Mid previous calendar month, so the history lands in the report window.
    let last_month = (MonthWindow::previous_month(now).start + Duration::days(14))
        .and_hms_opt(12, 0, 0)
        .unwrap_or_default()
        .and_utc();

    // Two templates due today: one never processed, one whose next date has
    // arrived.
    store
        .insert_transaction(Transaction {
            id: TransactionId::new(),
            user_id,
            account_id,
            transaction_type: TransactionType::Expense,
            amount: dec!(1200),
            date: last_month,
            category: "housing".to_string(),
            description: "Rent".to_string(),
            status: TransactionStatus::Completed,
            is_recurring: true,
            recurring_interval: Some(RecurringInterval::Monthly),
            last_processed: None,
            next_recurring_date: None,
        })
        .await;
    store
        .insert_transaction(Transaction {
            id: TransactionId::new(),
            user_id,
            account_id,
            transaction_type: TransactionType::Income,
            amount: dec!(3000),
            date: last_month,
            category: "salary".to_string(),
            description: "Salary".to_string(),
            status: TransactionStatus::Completed,
            is_recurring: true,
            recurring_interval: Some(RecurringInterval::Monthly),
            last_processed: Some(last_month),
            next_recurring_date: Some(now - Duration::days(1)),
        })
        .await;

    // Plain history inside the previous month so the report has substance.
    for (amount, category) in [(dec!(150), "food"), (dec!(60), "transport")] {
        store
            .insert_transaction(Transaction {
                id: TransactionId::new(),
                user_id,
                account_id,
                transaction_type: TransactionType::Expense,
                amount,
                date: last_month,
                category: category.to_string(),
                description: category.to_string(),
                status: TransactionStatus::Completed,
                is_recurring: false,
                recurring_interval: None,
                last_processed: None,
                next_recurring_date: None,
            })
            .await;
    }

    info!(%user_id, %account_id, "seeded demo data");
}
