//! Shared types, errors, and configuration for Moneta.
//!
//! This crate provides common building blocks used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error taxonomy
//! - Configuration management
//! - SMTP email delivery

pub mod config;
pub mod email;
pub mod error;
pub mod types;

pub use config::{AppConfig, EmailConfig, InsightConfig, RecurrenceConfig};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
