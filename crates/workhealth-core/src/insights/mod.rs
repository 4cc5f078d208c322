//! Boundary to the external insight generator.
//!
//! The generator turns a [`WorkHealthMetrics`] plus the day's events into
//! free-text insights. Its output is untrusted: [`validate_response`] checks
//! the shape, and [`fallback_insights`] provides a deterministic substitute
//! whenever the generator fails.

pub mod fallback;
pub mod http;
pub mod validate;

pub use fallback::fallback_insights;
pub use http::HttpInsightGenerator;
pub use validate::{validate_response, InsightResponse};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::WorkHealthMetrics;
use crate::calendar::CalendarEvent;
use crate::context::UserContext;
use crate::error::InsightGenerationError;

/// Dashboard tab the insights are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabType {
    #[default]
    Overview,
    Performance,
    Resilience,
    Sustainability,
}

impl TabType {
    pub const ALL: [TabType; 4] = [
        TabType::Overview,
        TabType::Performance,
        TabType::Resilience,
        TabType::Sustainability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabType::Overview => "overview",
            TabType::Performance => "performance",
            TabType::Resilience => "resilience",
            TabType::Sustainability => "sustainability",
        }
    }
}

impl std::fmt::Display for TabType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TabType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overview" => Ok(TabType::Overview),
            "performance" => Ok(TabType::Performance),
            "resilience" => Ok(TabType::Resilience),
            "sustainability" => Ok(TabType::Sustainability),
            other => Err(format!(
                "unknown tab '{other}' (expected overview, performance, resilience or sustainability)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub impact: Impact,
}

/// The fixed response shape of the insight generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSet {
    pub insights: Vec<Insight>,
    pub summary: String,
    pub overall_score: u32,
    pub risk_factors: Vec<String>,
    pub opportunities: Vec<String>,
    pub predictive_alerts: Vec<String>,
}

/// Everything the generator is given for one tab of one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    pub metrics: WorkHealthMetrics,
    pub events: Vec<CalendarEvent>,
    pub tab: TabType,
    pub timezone: String,
    pub context: UserContext,
}

/// An external text generator. Returns the raw response body; the caller
/// validates it.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: &InsightRequest) -> Result<String, InsightGenerationError>;
}

/// Generator used when no endpoint is configured. Always fails, so callers
/// fall back to rule-based insights.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledInsightGenerator;

#[async_trait]
impl InsightGenerator for DisabledInsightGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _request: &InsightRequest) -> Result<String, InsightGenerationError> {
        Err(InsightGenerationError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_parsing() {
        assert_eq!("overview".parse::<TabType>(), Ok(TabType::Overview));
        assert_eq!("Resilience".parse::<TabType>(), Ok(TabType::Resilience));
        assert!("dashboard".parse::<TabType>().is_err());
        for tab in TabType::ALL {
            assert_eq!(tab.as_str().parse::<TabType>(), Ok(tab));
        }
    }

    #[test]
    fn test_tab_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TabType::Sustainability).unwrap(),
            "\"sustainability\""
        );
    }
}
