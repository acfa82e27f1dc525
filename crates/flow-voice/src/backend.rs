//! HTTP client for the assistant backend.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

// Commands can fan out into multi-task flows; give them room.
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(180);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unexpected backend response: {0}")]
    Malformed(String),
}

/// Response to a delivered command.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendReply {
    pub status: String,
    pub response: String,
    pub execution_time: f64,
    pub timestamp: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Backend health snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub model_initialized: bool,
    pub api_key_present: bool,
    pub conversation_length: usize,
    pub a2a_flow_enabled: bool,
    #[serde(default)]
    pub a2a_components: Value,
}

/// Client delivering captured commands to the backend.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new() -> Result<Self, BackendError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Deliver one command and wait for the full flow to finish.
    pub async fn send_message(&self, message: &str) -> Result<BackendReply, BackendError> {
        let url = format!("{}/message", self.base_url);
        let response = self
            .http
            .post(&url)
            .timeout(MESSAGE_TIMEOUT)
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))
    }

    /// Probe backend health.
    pub async fn health(&self) -> Result<HealthReport, BackendError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))
    }
}
