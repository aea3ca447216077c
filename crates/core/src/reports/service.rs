//! Monthly statistics and deterministic insight text.

use crate::ledger::types::{Transaction, TransactionType};

use super::types::{MonthlyStats, INSIGHT_COUNT};

/// Service for monthly aggregation and insight fallbacks.
pub struct ReportService;

impl ReportService {
    /// Folds a month's transactions into statistics.
    ///
    /// Income accumulates into `total_income`; expenses accumulate into both
    /// `total_expenses` and their category bucket, so
    /// `total_expenses == sum(by_category.values())` holds by construction.
    #[must_use]
    pub fn monthly_stats<'a, I>(transactions: I) -> MonthlyStats
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut stats = MonthlyStats::default();
        for tx in transactions {
            match tx.transaction_type {
                TransactionType::Income => stats.total_income += tx.amount,
                TransactionType::Expense => {
                    stats.total_expenses += tx.amount;
                    *stats.by_category.entry(tx.category.clone()).or_default() += tx.amount;
                }
            }
        }
        stats
    }

    /// Deterministic insights for a month with no categorized expenses.
    #[must_use]
    pub fn no_category_insights() -> [String; INSIGHT_COUNT] {
        [
            "You did not record expenses by category this month.".to_string(),
            "Adding categories will help you understand where your money goes.".to_string(),
            "Once categories are added, you will get clearer monthly insights.".to_string(),
        ]
    }

    /// Deterministic insights derived purely from the numeric statistics,
    /// used when the generator collaborator is unavailable or returns
    /// malformed output.
    #[must_use]
    pub fn fallback_insights(stats: &MonthlyStats) -> [String; INSIGHT_COUNT] {
        let spending_line = stats
            .by_category
            .iter()
            .max_by_key(|(_, amount)| **amount)
            .map_or_else(
                || "Most of your spending came from one or two categories.".to_string(),
                |(category, amount)| {
                    format!("Your biggest spending category was {category} at {amount}.")
                },
            );

        [
            format!(
                "You earned {} and spent {} this month.",
                stats.total_income, stats.total_expenses
            ),
            spending_line,
            "Watching these expenses can help you save more money.".to_string(),
        ]
    }
}
