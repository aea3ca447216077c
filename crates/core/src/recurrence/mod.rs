//! Calendar arithmetic for recurring templates.
//!
//! A recurring template carries an interval tag; this module computes the
//! next occurrence date for each tag. Month-end handling is explicit:
//! advancing past a shorter month clamps to that month's last day.

pub mod schedule;

#[cfg(test)]
mod schedule_props;

pub use schedule::{next_occurrence, RecurringInterval};
