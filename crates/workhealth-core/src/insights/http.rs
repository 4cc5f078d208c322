//! Insight generator backed by an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use indoc::indoc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{InsightGenerator, InsightRequest};
use crate::error::InsightGenerationError;

const SYSTEM_PROMPT: &str = indoc! {r#"
    You analyse one day of a knowledge worker's calendar.
    The user message is a JSON object with precomputed metrics, the day's
    meetings, the dashboard tab to focus on, and the user's preferences.
    Answer with a single JSON object and nothing else:
    {
      "insights": [{"title": string, "description": string, "impact": "high"|"medium"|"low"}],
      "summary": string,
      "overallScore": integer 0-100,
      "riskFactors": [string],
      "opportunities": [string],
      "predictiveAlerts": [string]
    }
    Do not recompute the metrics; explain them.
"#};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct HttpInsightGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpInsightGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn call(&self, request: &InsightRequest) -> Result<String, InsightGenerationError> {
        let user_content = serde_json::to_string(request)
            .map_err(|e| InsightGenerationError::Malformed(e.to_string()))?;

        let body = json!({
            "model": self.model,
            "temperature": 0.3,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_content},
            ],
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InsightGenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| InsightGenerationError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InsightGenerationError::Malformed("no message content".to_string()))
    }
}

#[async_trait]
impl InsightGenerator for HttpInsightGenerator {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, request: &InsightRequest) -> Result<String, InsightGenerationError> {
        tokio::time::timeout(self.timeout, self.call(request))
            .await
            .map_err(|_| InsightGenerationError::Timeout(self.timeout.as_secs()))?
    }
}
