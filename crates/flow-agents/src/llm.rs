//! Anthropic Messages API client.
//!
//! Thin reqwest wrapper with one extra capability the pipeline relies on:
//! structured output via a forced tool call, so router and synthesis
//! decisions come back as JSON matching a declared schema instead of free
//! text.

use std::time::Duration;

use flow_core::traits::AgentError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Message role on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of model context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A tool declaration used to force structured output.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Sampling parameters for one call.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<&'a ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        #[allow(dead_code)]
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Create a client for the default endpoint and model.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the endpoint base URL (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send(
        &self,
        system: &str,
        messages: &[ChatMessage],
        sampling: Sampling,
        tool: Option<&ToolSpec>,
    ) -> Result<MessagesResponse, AgentError> {
        let request = MessagesRequest {
            model: &self.model,
            system,
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            tools: tool.map(|t| vec![t]),
            tool_choice: tool.map(|t| serde_json::json!({ "type": "tool", "name": t.name })),
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
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

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| AgentError::Malformed(e.to_string()))
    }

    /// Plain completion: returns all text blocks joined.
    ///
    /// # Errors
    /// Returns error on transport, HTTP or decode failure.
    pub async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
        sampling: Sampling,
    ) -> Result<String, AgentError> {
        let response = self.send(system, messages, sampling, None).await?;

        let text: Vec<String> = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                _ => None,
            })
            .collect();

        if text.is_empty() {
            return Err(AgentError::Malformed("no text content in response".into()));
        }
        Ok(text.join("\n"))
    }

    /// Structured completion: forces a call of `tool` and deserializes its
    /// input into `T`.
    ///
    /// # Errors
    /// Returns error on transport, HTTP or decode failure, or when the model
    /// produced no tool call.
    pub async fn structured<T: DeserializeOwned>(
        &self,
        system: &str,
        messages: &[ChatMessage],
        sampling: Sampling,
        tool: &ToolSpec,
    ) -> Result<T, AgentError> {
        let response = self.send(system, messages, sampling, Some(tool)).await?;

        let input = response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { input, .. } => Some(input),
                _ => None,
            })
            .ok_or_else(|| AgentError::Malformed("no tool call in response".into()))?;

        serde_json::from_value(input).map_err(|e| AgentError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_use_block_decodes() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "routing"},
                {"type": "tool_use", "id": "tu_1", "name": "route_decision",
                 "input": {"decision_type": "final_response",
                           "content": {"response": "Paris", "reasoning": "knowledge"}}}
            ]
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        let tool_input = parsed
            .content
            .into_iter()
            .find_map(|b| match b {
                ContentBlock::ToolUse { input, .. } => Some(input),
                _ => None,
            })
            .unwrap();
        assert_eq!(tool_input["content"]["response"], "Paris");
    }

    #[test]
    fn unknown_blocks_are_tolerated() {
        let body = r#"{"content": [{"type": "thinking", "thinking": "..."},
                                    {"type": "text", "text": "hi"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content.len(), 2);
    }

    #[test]
    fn request_serializes_tool_choice() {
        let tool = ToolSpec {
            name: "route_decision",
            description: "Routing decision",
            input_schema: serde_json::json!({"type": "object"}),
        };
        let request = MessagesRequest {
            model: "m",
            system: "s",
            messages: &[ChatMessage::user("hello")],
            temperature: 0.1,
            max_tokens: 2048,
            tools: Some(vec![&tool]),
            tool_choice: Some(serde_json::json!({"type": "tool", "name": tool.name})),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tool_choice"]["name"], "route_decision");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
