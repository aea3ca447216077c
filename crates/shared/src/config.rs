//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Recurrence processing configuration.
    #[serde(default)]
    pub recurrence: RecurrenceConfig,
    /// Email delivery configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Insight generator configuration.
    #[serde(default)]
    pub insights: InsightConfig,
}

/// Recurrence processing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// Maximum work-item starts per user within the throttle period.
    #[serde(default = "default_throttle_limit")]
    pub throttle_limit: usize,
    /// Rolling throttle window in seconds.
    #[serde(default = "default_throttle_period_secs")]
    pub throttle_period_secs: u64,
    /// Capacity of the work-item queue between the due scan and the processor.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            throttle_limit: default_throttle_limit(),
            throttle_period_secs: default_throttle_period_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_throttle_limit() -> usize {
    10
}

fn default_throttle_period_secs() -> u64 {
    60
}

fn default_queue_capacity() -> usize {
    1024
}

/// Email delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP server host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_name: default_from_name(),
            from_email: default_from_email(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_name() -> String {
    "Moneta".to_string()
}

fn default_from_email() -> String {
    "reports@moneta.local".to_string()
}

/// Insight generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightConfig {
    /// Endpoint of the text-generation API.
    #[serde(default = "default_insight_api_url")]
    pub api_url: String,
    /// API key, empty if unset.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_insight_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_url: default_insight_api_url(),
            api_key: String::new(),
            timeout_secs: default_insight_timeout_secs(),
        }
    }
}

fn default_insight_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-flash-lite:generateContent"
        .to_string()
}

fn default_insight_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MONETA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
