//! Core business logic for Moneta.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, calendar arithmetic, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Transactions, accounts, and balance-safe mutation planning
//! - `recurrence` - Calendar arithmetic for recurring templates
//! - `reports` - Monthly aggregation and insight text

pub mod ledger;
pub mod recurrence;
pub mod reports;
