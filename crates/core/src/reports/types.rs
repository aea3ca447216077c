//! Monthly report types.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Every report carries exactly this many insight strings, whichever path
/// produced them.
pub const INSIGHT_COUNT: usize = 3;

/// An inclusive calendar-month window `[first_of_month, last_of_month]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    /// First day of the month.
    pub start: NaiveDate,
    /// Last day of the month.
    pub end: NaiveDate,
}

impl MonthWindow {
    /// The window covering the calendar month before `now`.
    ///
    /// # Panics
    ///
    /// Panics at the bounds of chrono's representable range, which real
    /// report runs never reach.
    #[must_use]
    pub fn previous_month(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let first_of_current = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .expect("first of month is a valid date");
        let end = first_of_current
            .pred_opt()
            .expect("calendar underflow computing previous month");
        let start = NaiveDate::from_ymd_opt(end.year(), end.month(), 1)
            .expect("first of month is a valid date");
        Self { start, end }
    }

    /// Whether the given instant falls inside this window.
    #[must_use]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let day = date.date_naive();
        day >= self.start && day <= self.end
    }

    /// Human-readable label, e.g. "January 2026".
    #[must_use]
    pub fn label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }
}

/// A user's aggregated activity for one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    /// Sum of income amounts.
    pub total_income: Decimal,
    /// Sum of expense amounts; equals the sum of `by_category` values.
    pub total_expenses: Decimal,
    /// Expense amounts keyed by category. Income is never categorized here.
    pub by_category: BTreeMap<String, Decimal>,
}

impl MonthlyStats {
    /// Money left over after expenses.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.total_income - self.total_expenses
    }
}

/// The assembled monthly report handed to the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Month label, e.g. "January 2026".
    pub month_label: String,
    /// Aggregated statistics.
    pub stats: MonthlyStats,
    /// Exactly three short natural-language insights.
    pub insights: [String; INSIGHT_COUNT],
}
