//! Tests for monthly aggregation and windows.

use chrono::{NaiveDate, TimeZone, Utc};
use moneta_shared::types::{AccountId, TransactionId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::ReportService;
use super::types::MonthWindow;
use crate::ledger::types::{Transaction, TransactionStatus, TransactionType};

fn tx(transaction_type: TransactionType, amount: Decimal, category: &str) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        user_id: UserId::new(),
        account_id: AccountId::new(),
        transaction_type,
        amount,
        date: Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
        category: category.to_string(),
        description: String::new(),
        status: TransactionStatus::Completed,
        is_recurring: false,
        recurring_interval: None,
        last_processed: None,
        next_recurring_date: None,
    }
}

#[test]
fn test_monthly_stats_fold() {
    let transactions = vec![
        tx(TransactionType::Expense, dec!(100), "food"),
        tx(TransactionType::Expense, dec!(50), "food"),
        tx(TransactionType::Expense, dec!(30), "transport"),
        tx(TransactionType::Income, dec!(1000), "salary"),
    ];

    let stats = ReportService::monthly_stats(&transactions);

    assert_eq!(stats.total_income, dec!(1000));
    assert_eq!(stats.total_expenses, dec!(180));
    assert_eq!(stats.by_category.len(), 2);
    assert_eq!(stats.by_category["food"], dec!(150));
    assert_eq!(stats.by_category["transport"], dec!(30));
    assert_eq!(stats.net(), dec!(820));

    let category_sum: Decimal = stats.by_category.values().copied().sum();
    assert_eq!(category_sum, stats.total_expenses);
}

#[test]
fn test_income_is_never_categorized() {
    let transactions = vec![tx(TransactionType::Income, dec!(1000), "salary")];
    let stats = ReportService::monthly_stats(&transactions);
    assert!(stats.by_category.is_empty());
    assert_eq!(stats.total_expenses, Decimal::ZERO);
}

#[test]
fn test_previous_month_window() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 5, 0).unwrap();
    let window = MonthWindow::previous_month(now);

    assert_eq!(window.start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    assert_eq!(window.end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    assert_eq!(window.label(), "February 2026");
}

#[test]
fn test_previous_month_window_across_year_boundary() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let window = MonthWindow::previous_month(now);

    assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    assert_eq!(window.end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    assert_eq!(window.label(), "December 2025");
}

#[test]
fn test_window_contains_is_inclusive() {
    let window = MonthWindow::previous_month(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());

    assert!(window.contains(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()));
    assert!(window.contains(Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap()));
    assert!(!window.contains(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
    assert!(!window.contains(Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap()));
}

#[test]
fn test_fallback_insights_are_exactly_three() {
    let stats = ReportService::monthly_stats(&[
        tx(TransactionType::Expense, dec!(150), "food"),
        tx(TransactionType::Expense, dec!(30), "transport"),
        tx(TransactionType::Income, dec!(1000), "salary"),
    ]);

    let insights = ReportService::fallback_insights(&stats);
    assert_eq!(insights.len(), 3);
    assert!(insights[0].contains("1000"));
    assert!(insights[0].contains("180"));
    assert!(insights[1].contains("food"));
}

#[test]
fn test_no_category_insights_are_exactly_three() {
    let insights = ReportService::no_category_insights();
    assert_eq!(insights.len(), 3);
    assert!(insights.iter().all(|line| !line.is_empty()));
}
