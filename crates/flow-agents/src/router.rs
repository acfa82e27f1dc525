//! Router agent: first stage of the flow.
//!
//! Decides whether a request gets a direct answer or a task list for the
//! specialized agents. Any failure degrades to an apologetic direct
//! response; there is deliberately no retry.

use flow_core::flow::{DirectReply, RouterDecision};
use serde_json::json;

use crate::llm::{ChatMessage, LlmClient, Sampling, ToolSpec};

const SYSTEM_PROMPT: &str = "You are a Router Agent. Decide between:

1. **final_response**: For questions you can answer directly (knowledge, explanations, conversations)
2. **task_list**: For actions requiring external agents:
   - **google_assistant**: ONLY for Gmail, Google Drive, Google Calendar actions
   - **web_use**: For web searches, browsing websites, finding information online, weather, shopping

**IMPORTANT DISTINCTIONS:**
- Weather/web searches -> web_use (not Google Assistant)
- Gmail/Calendar/Drive -> google_assistant
- Shopping/prices -> web_use

Examples:
- \"What's the weather in NYC?\" -> web_use task
- \"Check my calendar\" -> google_assistant task
- \"Find iPhone prices\" -> web_use task
- \"Send email to John\" -> google_assistant task

Be specific in task instructions.";

// Low temperature keeps routing decisions consistent.
const SAMPLING: Sampling = Sampling {
    temperature: 0.1,
    max_tokens: 2048,
};

fn decision_tool() -> ToolSpec {
    ToolSpec {
        name: "route_decision",
        description: "Record the routing decision for the user's request",
        input_schema: json!({
            "type": "object",
            "required": ["decision_type", "content"],
            "properties": {
                "decision_type": {
                    "type": "string",
                    "enum": ["final_response", "task_list"]
                },
                "content": {
                    "oneOf": [
                        {
                            "type": "object",
                            "required": ["response", "reasoning"],
                            "properties": {
                                "response": {"type": "string"},
                                "reasoning": {"type": "string"}
                            }
                        },
                        {
                            "type": "object",
                            "required": ["tasks", "reasoning"],
                            "properties": {
                                "tasks": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "required": ["task_type", "instructions"],
                                        "properties": {
                                            "task_type": {
                                                "type": "string",
                                                "enum": ["google_assistant", "web_use"]
                                            },
                                            "instructions": {"type": "string"}
                                        }
                                    }
                                },
                                "reasoning": {"type": "string"}
                            }
                        }
                    ]
                }
            }
        }),
    }
}

fn fallback(error: &impl std::fmt::Display) -> RouterDecision {
    RouterDecision::FinalResponse(DirectReply {
        response: format!(
            "I apologize, but I encountered an error processing your request: {error}"
        ),
        reasoning: "Fallback response due to router agent error".into(),
    })
}

/// Router agent that determines the flow path for user requests.
pub struct RouterAgent {
    llm: LlmClient,
}

impl RouterAgent {
    #[must_use]
    pub const fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Analyze a request and return the routing decision.
    ///
    /// `history` is optional prior conversation context, oldest first.
    pub async fn route(&self, user_message: &str, history: &[ChatMessage]) -> RouterDecision {
        tracing::debug!(message = %truncate(user_message, 100), "Router analyzing request");

        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(format!("User request: {user_message}")));

        let tool = decision_tool();
        match self
            .llm
            .structured::<RouterDecision>(SYSTEM_PROMPT, &messages, SAMPLING, &tool)
            .await
        {
            Ok(decision) => {
                match &decision {
                    RouterDecision::FinalResponse(reply) => {
                        tracing::info!(response = %truncate(&reply.response, 200), "Router decided: direct response");
                    }
                    RouterDecision::TaskList(list) => {
                        tracing::info!(
                            tasks = list.tasks.len(),
                            reasoning = %list.reasoning,
                            "Router decided: execute tasks"
                        );
                    }
                }
                decision
            }
            Err(e) => {
                tracing::error!("Router agent error: {e}");
                fallback(&e)
            }
        }
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
