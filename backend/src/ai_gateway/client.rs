//! Client for the generative-language `generateContent` endpoint.
//!
//! Every operation is one stateless round trip: build a prompt, post it,
//! return the first candidate's text. Failures are never retried and never
//! replaced with canned text here; callers decide what to show.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    analytics::aggregator::CategoryCount,
    settings::AiSettings,
    task::Task,
};

use super::prompts::{self, InsightCounts};

/// Upstream failure: transport error, timeout, non-2xx status or an
/// unreadable body. `status` is the upstream HTTP status when one was seen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("AI gateway request failed: {message}")]
pub struct AiGatewayError {
    pub status: Option<u16>,
    pub message: String,
}

impl AiGatewayError {
    fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

pub struct AiGateway {
    http: reqwest::Client,
    settings: AiSettings,
}

impl AiGateway {
    pub fn new(settings: AiSettings) -> Result<Self, AiGatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AiGatewayError::new(None, format!("cannot build HTTP client: {e}")))?;
        Ok(Self { http, settings })
    }

    pub async fn suggest_priority(&self, task: &Task, now: DateTime<Utc>) -> Result<String, AiGatewayError> {
        self.generate(&prompts::priority_prompt(task, now)).await
    }

    pub async fn generate_daily_plan(&self, tasks: &[Task], now: DateTime<Utc>) -> Result<String, AiGatewayError> {
        self.generate(&prompts::daily_plan_prompt(tasks, now)).await
    }

    pub async fn summarize_insights(&self, counts: &InsightCounts) -> Result<String, AiGatewayError> {
        self.generate(&prompts::insights_prompt(counts)).await
    }

    pub async fn motivational_quote(&self) -> Result<String, AiGatewayError> {
        self.generate(&prompts::quote_prompt()).await
    }

    pub async fn weekly_focus_suggestion(&self, counts: &[CategoryCount]) -> Result<String, AiGatewayError> {
        self.generate(&prompts::weekly_focus_prompt(counts)).await
    }

    /// Send one prompt and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiGatewayError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AiGatewayError::new(None, "generative-language API key is not configured"))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_k: self.settings.top_k,
                top_p: self.settings.top_p,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        debug!(model = %self.settings.model, prompt_len = prompt.len(), "sending generateContent request");
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&raw)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("upstream request failed")
                        .to_string()
                });
            warn!(status = status.as_u16(), %message, "generateContent returned an error status");
            return Err(AiGatewayError::new(Some(status.as_u16()), message));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            AiGatewayError::new(Some(status.as_u16()), format!("unreadable response body: {e}"))
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AiGatewayError::new(Some(status.as_u16()), "response contained no candidates"))
    }

    fn transport_error(&self, error: reqwest::Error) -> AiGatewayError {
        let status = error.status().map(|s| s.as_u16());
        let message = if error.is_timeout() {
            format!("request timed out after {}s", self.settings.timeout_secs)
        } else {
            // reqwest errors carry the full URL, which includes the key.
            error.without_url().to_string()
        };
        warn!(%message, "generateContent request failed");
        AiGatewayError::new(status, message)
    }
}
