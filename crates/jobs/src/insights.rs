//! Insight generation for monthly reports.
//!
//! Insights come from an external text-generation collaborator. The
//! collaborator may be down, time out, or return malformed output; none of
//! that may ever fail a report. [`financial_insights`] always resolves to
//! exactly three strings, from the generator or from the deterministic
//! fallback.

use async_trait::async_trait;
use moneta_core::reports::{MonthlyStats, ReportService, INSIGHT_COUNT};
use moneta_shared::InsightConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Insight generator errors.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The HTTP call failed or the service answered with an error status.
    #[error("Insight service unavailable: {0}")]
    Unavailable(String),
    /// The service answered but not with a usable insight list.
    #[error("Invalid insight response: {0}")]
    InvalidResponse(String),
}

/// External collaborator turning monthly statistics into short
/// natural-language insights.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Requests insight strings for one user's month.
    async fn generate(
        &self,
        stats: &MonthlyStats,
        month_label: &str,
    ) -> Result<Vec<String>, InsightError>;
}

/// Produces exactly [`INSIGHT_COUNT`] insights for a month.
///
/// An empty category map short-circuits to the deterministic no-category
/// text without calling the generator. A generator failure, or any reply
/// that is not exactly three strings, falls back to the deterministic
/// numeric template.
pub async fn financial_insights<G: InsightGenerator>(
    generator: &G,
    stats: &MonthlyStats,
    month_label: &str,
) -> [String; INSIGHT_COUNT] {
    if stats.by_category.is_empty() {
        return ReportService::no_category_insights();
    }

    match generator.generate(stats, month_label).await {
        Ok(lines) => <[String; INSIGHT_COUNT]>::try_from(lines).unwrap_or_else(|lines| {
            warn!(count = lines.len(), "insight generator returned wrong arity");
            ReportService::fallback_insights(stats)
        }),
        Err(err) => {
            warn!(error = %err, "insight generator failed, using fallback");
            ReportService::fallback_insights(stats)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Insight generator backed by a Gemini-compatible HTTP endpoint.
pub struct HttpInsightGenerator {
    client: reqwest::Client,
    config: InsightConfig,
}

impl HttpInsightGenerator {
    /// Creates a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: InsightConfig) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InsightError::Unavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn prompt(stats: &MonthlyStats, month_label: &str) -> String {
        let categories = stats
            .by_category
            .iter()
            .map(|(category, amount)| format!("{category}: {amount}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are helping a customer understand their monthly spending.\n\
             Use SIMPLE, friendly language. Avoid technical or financial terms.\n\
             Return ONLY a valid JSON array of exactly 3 insights.\n\n\
             Monthly summary for {month_label}:\n\
             Income: {income}\n\
             Expenses: {expenses}\n\
             Remaining money: {net}\n\n\
             Spending by category:\n{categories}\n\n\
             Return format:\n[\"insight 1\", \"insight 2\", \"insight 3\"]",
            income = stats.total_income,
            expenses = stats.total_expenses,
            net = stats.net(),
        )
    }

    /// Pulls the JSON array out of a possibly chatty model reply.
    fn parse_insights(text: &str) -> Result<Vec<String>, InsightError> {
        let start = text
            .find('[')
            .ok_or_else(|| InsightError::InvalidResponse("no JSON array in reply".to_string()))?;
        let end = text
            .rfind(']')
            .ok_or_else(|| InsightError::InvalidResponse("unterminated JSON array".to_string()))?;
        if end < start {
            return Err(InsightError::InvalidResponse(
                "unterminated JSON array".to_string(),
            ));
        }
        serde_json::from_str(&text[start..=end])
            .map_err(|e| InsightError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl InsightGenerator for HttpInsightGenerator {
    async fn generate(
        &self,
        stats: &MonthlyStats,
        month_label: &str,
    ) -> Result<Vec<String>, InsightError> {
        let url = format!("{}?key={}", self.config.api_url, self.config.api_key);
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": Self::prompt(stats, month_label) }],
            }],
            "generationConfig": { "temperature": 1.2 },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InsightError::Unavailable(format!(
                "status {}",
                response.status()
            )));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InsightError::InvalidResponse(e.to_string()))?;

        let text = reply
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .unwrap_or_default();

        Self::parse_insights(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use rust_decimal_macros::dec;

    use super::*;

    struct StubGenerator {
        reply: Result<Vec<String>, InsightError>,
        called: AtomicBool,
    }

    impl StubGenerator {
        fn ok(lines: &[&str]) -> Self {
            Self {
                reply: Ok(lines.iter().map(ToString::to_string).collect()),
                called: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(InsightError::Unavailable("down".to_string())),
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl InsightGenerator for StubGenerator {
        async fn generate(
            &self,
            _stats: &MonthlyStats,
            _month_label: &str,
        ) -> Result<Vec<String>, InsightError> {
            self.called.store(true, Ordering::SeqCst);
            match &self.reply {
                Ok(lines) => Ok(lines.clone()),
                Err(err) => Err(InsightError::Unavailable(err.to_string())),
            }
        }
    }

    fn stats_with_categories() -> MonthlyStats {
        let mut stats = MonthlyStats::default();
        stats.total_income = dec!(1000);
        stats.total_expenses = dec!(180);
        stats.by_category.insert("food".to_string(), dec!(150));
        stats.by_category.insert("transport".to_string(), dec!(30));
        stats
    }

    #[tokio::test]
    async fn test_generator_output_passes_through() {
        let generator = StubGenerator::ok(&["one", "two", "three"]);
        let insights = financial_insights(&generator, &stats_with_categories(), "January").await;
        assert_eq!(insights, ["one", "two", "three"].map(String::from));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_three_strings() {
        let generator = StubGenerator::failing();
        let insights = financial_insights(&generator, &stats_with_categories(), "January").await;
        assert_eq!(insights.len(), 3);
        assert!(insights[0].contains("1000"));
    }

    #[tokio::test]
    async fn test_wrong_arity_falls_back() {
        let generator = StubGenerator::ok(&["only", "two"]);
        let insights = financial_insights(&generator, &stats_with_categories(), "January").await;
        assert_eq!(insights.len(), 3);
        assert!(insights[1].contains("food"));
    }

    #[tokio::test]
    async fn test_empty_categories_short_circuit_without_calling_generator() {
        let generator = StubGenerator::ok(&["one", "two", "three"]);
        let stats = MonthlyStats::default();

        let insights = financial_insights(&generator, &stats, "January").await;

        assert_eq!(insights, ReportService::no_category_insights());
        assert!(!generator.called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_parse_insights_extracts_array_from_chatty_reply() {
        let text = "Sure! Here are your insights:\n[\"a\", \"b\", \"c\"]\nHave a nice day.";
        let lines = HttpInsightGenerator::parse_insights(text).unwrap();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_insights_rejects_prose() {
        assert!(HttpInsightGenerator::parse_insights("no array here").is_err());
    }
}
