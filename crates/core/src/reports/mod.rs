//! Monthly aggregation and insight text.
//!
//! This module provides pure business logic for the monthly report pipeline:
//! - Previous-month window calculation
//! - Folding a user's transactions into monthly statistics
//! - Deterministic insight text used when the generator collaborator fails

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::ReportService;
pub use types::{MonthWindow, MonthlyReport, MonthlyStats, INSIGHT_COUNT};
