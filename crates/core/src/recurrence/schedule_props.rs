//! Property-based tests for the recurrence schedule.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use proptest::prelude::*;

use super::schedule::{next_occurrence, RecurringInterval};

fn interval_strategy() -> impl Strategy<Value = RecurringInterval> {
    prop_oneof![
        Just(RecurringInterval::Daily),
        Just(RecurringInterval::Weekly),
        Just(RecurringInterval::Monthly),
        Just(RecurringInterval::Yearly),
    ]
}

/// Arbitrary instants across several decades, hitting month ends often.
fn datetime_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (2000i32..2100, 1u32..=12, 1u32..=31, 0u32..24, 0u32..60).prop_filter_map(
        "valid calendar date",
        |(y, m, d, h, min)| Utc.with_ymd_and_hms(y, m, d, h, min, 0).single(),
    )
}

proptest! {
    /// For all intervals i and dates d: next_occurrence(d, i) > d.
    #[test]
    fn test_next_occurrence_strictly_increases(
        from in datetime_strategy(),
        interval in interval_strategy(),
    ) {
        prop_assert!(next_occurrence(from, interval) > from);
    }

    /// Monthly advance lands in the following calendar month and never
    /// overshoots the original day-of-month.
    #[test]
    fn test_monthly_lands_in_next_month(from in datetime_strategy()) {
        let next = next_occurrence(from, RecurringInterval::Monthly);
        let expected_month = if from.month() == 12 { 1 } else { from.month() + 1 };
        prop_assert_eq!(next.month(), expected_month);
        prop_assert!(next.day() <= from.day());
    }

    /// Yearly advance keeps the month and never overshoots the day.
    #[test]
    fn test_yearly_keeps_month(from in datetime_strategy()) {
        let next = next_occurrence(from, RecurringInterval::Yearly);
        prop_assert_eq!(next.year(), from.year() + 1);
        prop_assert_eq!(next.month(), from.month());
        prop_assert!(next.day() <= from.day());
    }

    /// The time-of-day component is preserved by every interval.
    #[test]
    fn test_time_of_day_preserved(
        from in datetime_strategy(),
        interval in interval_strategy(),
    ) {
        let next = next_occurrence(from, interval);
        prop_assert_eq!(next.time(), from.time());
    }
}
