//! Web research agent.
//!
//! Answers search/browse style instructions with the LLM, optionally
//! pulling in the contents of a URL mentioned in the instructions. Page
//! fetches are best effort; the model still answers when one fails.

use std::time::Duration;

use async_trait::async_trait;
use flow_core::traits::{AgentError, AgentReply, TaskAgent};

use crate::llm::{ChatMessage, LlmClient, Sampling};
use crate::router::truncate;

const SYSTEM_PROMPT: &str = "You are a Web Research Agent. Answer the user's instruction using your knowledge and any page content provided. Be factual and concise. When you cannot verify current information, say so explicitly rather than guessing.";

const SAMPLING: Sampling = Sampling {
    temperature: 0.2,
    max_tokens: 4096,
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const PAGE_EXCERPT_CHARS: usize = 8000;

/// Agent handling web search and browsing tasks.
pub struct WebUseAgent {
    llm: LlmClient,
    http: reqwest::Client,
}

impl WebUseAgent {
    pub fn new(llm: LlmClient) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Transport(e.to_string()))?;
        Ok(Self { llm, http })
    }

    async fn fetch_page(&self, url: &str) -> Option<String> {
        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => Some(truncate(&body, PAGE_EXCERPT_CHARS).to_owned()),
                Err(e) => {
                    tracing::warn!(url, "Failed to read page body: {e}");
                    None
                }
            },
            Ok(response) => {
                tracing::warn!(url, status = %response.status(), "Page fetch rejected");
                None
            }
            Err(e) => {
                tracing::warn!(url, "Page fetch failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl TaskAgent for WebUseAgent {
    async fn run(&self, instructions: &str) -> Result<AgentReply, AgentError> {
        let url = extract_url(instructions);
        let page = match &url {
            Some(url) => self.fetch_page(url).await,
            None => None,
        };

        let prompt = match &page {
            Some(content) => format!(
                "Instruction: {instructions}\n\nFetched page content:\n{content}"
            ),
            None => format!("Instruction: {instructions}"),
        };

        let messages = [ChatMessage::user(prompt)];
        let text = self.llm.complete(SYSTEM_PROMPT, &messages, SAMPLING).await?;
        Ok(AgentReply {
            text,
            final_url: url,
        })
    }
}

/// Find the first http(s) URL embedded in an instruction.
fn extract_url(instructions: &str) -> Option<String> {
    instructions
        .split_whitespace()
        .find(|word| word.starts_with("http://") || word.starts_with("https://"))
        .map(|word| word.trim_end_matches(['.', ',', ')', ']']).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_url_in_instructions() {
        assert_eq!(
            extract_url("summarize https://example.com/page please"),
            Some("https://example.com/page".to_owned())
        );
    }

    #[test]
    fn strips_trailing_punctuation() {
        assert_eq!(
            extract_url("check https://example.com/page."),
            Some("https://example.com/page".to_owned())
        );
    }

    #[test]
    fn no_url_yields_none() {
        assert_eq!(extract_url("what's the weather in NYC?"), None);
    }
}
