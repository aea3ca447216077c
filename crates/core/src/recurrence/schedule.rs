//! Next-occurrence calculation for the four recurrence intervals.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// How often a recurring template materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurringInterval {
    /// Every calendar day.
    Daily,
    /// Every 7 calendar days.
    Weekly,
    /// Every calendar month, clamped to the last day of shorter months.
    Monthly,
    /// Every calendar year; Feb 29 clamps to Feb 28 outside leap years.
    Yearly,
}

impl std::fmt::Display for RecurringInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "DAILY"),
            Self::Weekly => write!(f, "WEEKLY"),
            Self::Monthly => write!(f, "MONTHLY"),
            Self::Yearly => write!(f, "YEARLY"),
        }
    }
}

/// Computes the next occurrence after `from` for the given interval.
///
/// MONTHLY and YEARLY use calendar arithmetic: the day-of-month is kept where
/// the target month allows it and clamped to the target month's last day
/// otherwise (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year). The
/// result is always strictly after `from`.
///
/// # Panics
///
/// Panics if the result would fall outside chrono's representable date range.
/// That is a programmer error, not a runtime condition: templates carry
/// real-world dates.
#[must_use]
pub fn next_occurrence(from: DateTime<Utc>, interval: RecurringInterval) -> DateTime<Utc> {
    match interval {
        RecurringInterval::Daily => from + Duration::days(1),
        RecurringInterval::Weekly => from + Duration::days(7),
        RecurringInterval::Monthly => from
            .checked_add_months(Months::new(1))
            .expect("calendar overflow advancing one month"),
        RecurringInterval::Yearly => from
            .checked_add_months(Months::new(12))
            .expect("calendar overflow advancing one year"),
    }
}
