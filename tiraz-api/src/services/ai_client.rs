//! Measurement inference service client
//!
//! One POST of `{"images": [...], "metadata": {...}}` to
//! `{AI_SERVICE_URL}/process_measurements`. No retry; callers decide what a
//! failure means.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const PROCESS_PATH: &str = "/process_measurements";
const USER_AGENT: &str = concat!("tiraz-api/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 512;

/// AI client errors
#[derive(Debug, Error)]
pub enum AiClientError {
    #[error("AI service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("AI service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service response was not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl AiClientError {
    /// Stable tag reported to API clients
    pub fn kind(&self) -> &'static str {
        match self {
            AiClientError::Transport(_) | AiClientError::Client(_) => "upstream_transport",
            AiClientError::Status { .. } => "upstream_status",
            AiClientError::Decode(_) => "upstream_decode",
        }
    }
}

#[derive(Serialize)]
struct ProcessPayload<'a, M: Serialize> {
    images: &'a [String],
    metadata: &'a M,
}

/// Client for the measurement inference service
#[derive(Debug, Clone)]
pub struct AiClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl AiClient {
    pub fn new(base_url: &str) -> Result<Self, AiClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AiClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(AiClientError::Client)?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PROCESS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send image paths plus metadata, return the decoded JSON body
    pub async fn process_measurements<M: Serialize>(
        &self,
        images: &[String],
        metadata: &M,
    ) -> Result<Value, AiClientError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            image_count = images.len(),
            "Calling AI measurement service"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ProcessPayload { images, metadata })
            .send()
            .await
            .map_err(AiClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiClientError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        // The timeout also covers reading the body
        let value: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AiClientError::Transport(e)
            } else {
                AiClientError::Decode(e)
            }
        })?;

        tracing::info!(
            status = status.as_u16(),
            has_measurements = value.get("measurements").is_some(),
            "AI measurement service responded"
        );

        Ok(value)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
