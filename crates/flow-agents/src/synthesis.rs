//! Final answer synthesis.
//!
//! Turns a batch of task results back into one natural response for the
//! user, acknowledging partial failures instead of hiding them.

use flow_core::flow::ExecutionSummary;
use serde::Deserialize;
use serde_json::json;

use crate::llm::{ChatMessage, LlmClient, Sampling, ToolSpec};
use crate::router::truncate;

const SYSTEM_PROMPT: &str = "You are a Final Answer Agent. Your job is to take the results of executed tasks and synthesize them into a clear, helpful response for the user.

Guidelines:
- Address the user's original request directly
- Weave the task results into a natural answer, not a report
- If some tasks failed, acknowledge what could not be completed and share what did succeed
- Keep the response concise and conversational";

const SAMPLING: Sampling = Sampling {
    temperature: 0.3,
    max_tokens: 2048,
};

// Per-task result text is capped before it goes into the prompt.
const RESULT_EXCERPT_CHARS: usize = 300;

/// Structured synthesis output.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisReply {
    pub response: String,
    pub summary: String,
    pub tasks_performed: Vec<String>,
}

fn synthesis_tool() -> ToolSpec {
    ToolSpec {
        name: "final_answer",
        description: "Record the synthesized answer for the user",
        input_schema: json!({
            "type": "object",
            "required": ["response", "summary", "tasks_performed"],
            "properties": {
                "response": {
                    "type": "string",
                    "description": "The final answer shown to the user"
                },
                "summary": {
                    "type": "string",
                    "description": "One-line summary of what was done"
                },
                "tasks_performed": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Short description of each task that ran"
                }
            }
        }),
    }
}

/// Agent that synthesizes task results into a final user-facing answer.
pub struct SynthesisAgent {
    llm: LlmClient,
}

impl SynthesisAgent {
    #[must_use]
    pub const fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Produce the final answer for `user_message` given the executed tasks.
    pub async fn synthesize(&self, user_message: &str, summary: &ExecutionSummary) -> SynthesisReply {
        let prompt = format_prompt(user_message, summary);
        let tool = synthesis_tool();
        let messages = [ChatMessage::user(prompt)];

        match self
            .llm
            .structured::<SynthesisReply>(SYSTEM_PROMPT, &messages, SAMPLING, &tool)
            .await
        {
            Ok(reply) => {
                tracing::info!(summary = %reply.summary, "Synthesized final answer");
                reply
            }
            Err(e) => {
                tracing::error!("Synthesis agent error: {e}");
                fallback(summary)
            }
        }
    }
}

fn format_prompt(user_message: &str, summary: &ExecutionSummary) -> String {
    let mut prompt = format!(
        "Original request: {user_message}\n\nExecuted {} task(s), {} successful, {} failed:\n",
        summary.total_tasks, summary.successful_tasks, summary.failed_tasks
    );
    for result in &summary.results {
        if result.success {
            prompt.push_str(&format!(
                "- [{}] succeeded: {}\n",
                result.kind.as_str(),
                truncate(&result.result, RESULT_EXCERPT_CHARS)
            ));
        } else {
            prompt.push_str(&format!(
                "- [{}] failed: {}\n",
                result.kind.as_str(),
                result.error_message.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    prompt.push_str("\nSynthesize these results into a final answer for the user.");
    prompt
}

fn fallback(summary: &ExecutionSummary) -> SynthesisReply {
    let response = if summary.successful_tasks > 0 {
        let mut parts = Vec::new();
        for result in &summary.results {
            if result.success {
                parts.push(truncate(&result.result, RESULT_EXCERPT_CHARS).to_owned());
            }
        }
        format!(
            "I completed {} of {} tasks. Here is what I found:\n{}",
            summary.successful_tasks,
            summary.total_tasks,
            parts.join("\n")
        )
    } else {
        "I apologize, but I was unable to complete the requested tasks.".to_owned()
    };

    SynthesisReply {
        response,
        summary: format!(
            "{}/{} tasks completed",
            summary.successful_tasks, summary.total_tasks
        ),
        tasks_performed: summary
            .results
            .iter()
            .map(|r| format!("{}: {}", r.kind.as_str(), r.task_id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::flow::{TaskKind, TaskResult};

    fn summary_with(results: Vec<TaskResult>) -> ExecutionSummary {
        let successful = results.iter().filter(|r| r.success).count();
        ExecutionSummary {
            total_tasks: results.len(),
            successful_tasks: successful,
            failed_tasks: results.len() - successful,
            results,
            total_execution_time: 1.0,
        }
    }

    fn ok_result(text: &str) -> TaskResult {
        TaskResult {
            task_id: "task_0_abcd1234".into(),
            kind: TaskKind::WebUse,
            success: true,
            result: text.into(),
            error_message: None,
            execution_time: 0.5,
        }
    }

    fn failed_result(error: &str) -> TaskResult {
        TaskResult {
            task_id: "task_1_abcd1234".into(),
            kind: TaskKind::GoogleAssistant,
            success: false,
            result: String::new(),
            error_message: Some(error.into()),
            execution_time: 0.5,
        }
    }

    #[test]
    fn prompt_includes_results_and_errors() {
        let summary = summary_with(vec![ok_result("72F and sunny"), failed_result("auth expired")]);
        let prompt = format_prompt("weather and calendar", &summary);
        assert!(prompt.contains("72F and sunny"));
        assert!(prompt.contains("auth expired"));
        assert!(prompt.contains("1 successful, 1 failed"));
    }

    #[test]
    fn prompt_truncates_long_results() {
        let long = "x".repeat(1000);
        let summary = summary_with(vec![ok_result(&long)]);
        let prompt = format_prompt("question", &summary);
        assert!(!prompt.contains(&long));
        assert!(prompt.contains(&"x".repeat(RESULT_EXCERPT_CHARS)));
    }

    #[test]
    fn fallback_reports_partial_success() {
        let summary = summary_with(vec![ok_result("found it"), failed_result("boom")]);
        let reply = fallback(&summary);
        assert!(reply.response.contains("1 of 2"));
        assert!(reply.response.contains("found it"));
        assert_eq!(reply.tasks_performed.len(), 2);
    }

    #[test]
    fn fallback_apologizes_when_everything_failed() {
        let summary = summary_with(vec![failed_result("boom")]);
        let reply = fallback(&summary);
        assert!(reply.response.contains("unable to complete"));
    }
}
