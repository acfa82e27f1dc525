//! Google workspace actions via the Airia pipeline API.

use std::time::Duration;

use async_trait::async_trait;
use flow_core::traits::{AgentError, AgentReply, TaskAgent};
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.airia.ai";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Agent that forwards Gmail/Drive/Calendar instructions to a hosted
/// Airia pipeline and relays its answer.
pub struct AiriaAgent {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pipeline_id: String,
}

impl AiriaAgent {
    pub fn new(api_key: impl Into<String>, pipeline_id: impl Into<String>) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            pipeline_id: pipeline_id.into(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TaskAgent for AiriaAgent {
    async fn run(&self, instructions: &str) -> Result<AgentReply, AgentError> {
        let url = format!("{}/v2/PipelineExecution/{}", self.base_url, self.pipeline_id);
        tracing::debug!(pipeline = %self.pipeline_id, "Calling Airia pipeline");

        let response = self
            .http
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({
                "userInput": instructions,
                "asyncOutput": false,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(REQUEST_TIMEOUT.as_secs_f64())
                } else {
                    AgentError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::Malformed(e.to_string()))?;
        Ok(AgentReply::text(extract_response_text(&body)))
    }
}

/// Pull the answer text out of an Airia response, whose shape varies by
/// pipeline configuration.
fn extract_response_text(body: &Value) -> String {
    for key in ["response", "output", "result"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            return text.to_owned();
        }
    }
    if let Some(data) = body.get("data") {
        if let Some(text) = data.get("response").and_then(Value::as_str) {
            return text.to_owned();
        }
        if let Some(text) = data.as_str() {
            return text.to_owned();
        }
    }
    if let Some(text) = body.get("message").and_then(Value::as_str) {
        return text.to_owned();
    }
    serde_json::to_string_pretty(body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_level_response() {
        let body = json!({"response": "Email sent to John"});
        assert_eq!(extract_response_text(&body), "Email sent to John");
    }

    #[test]
    fn probes_alternate_keys_in_order() {
        let body = json!({"output": "from output"});
        assert_eq!(extract_response_text(&body), "from output");

        let body = json!({"data": {"response": "nested"}});
        assert_eq!(extract_response_text(&body), "nested");

        let body = json!({"data": "plain data"});
        assert_eq!(extract_response_text(&body), "plain data");

        let body = json!({"message": "fallback message"});
        assert_eq!(extract_response_text(&body), "fallback message");
    }

    #[test]
    fn unknown_shape_is_pretty_printed() {
        let body = json!({"unexpected": {"deeply": "nested"}});
        let text = extract_response_text(&body);
        assert!(text.contains("unexpected"));
        assert!(text.contains("nested"));
    }
}
