//! Data model for the agent-to-agent flow.
//!
//! These types travel between the router, the task executor and the
//! synthesis agent, and make up the structured output the LLM is asked to
//! produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of task a specialized agent can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Assistant pipeline tasks (mail, calendar, reminders, devices).
    GoogleAssistant,
    /// Web lookups: searches, prices, weather, news.
    WebUse,
}

impl TaskKind {
    /// Wire name, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoogleAssistant => "google_assistant",
            Self::WebUse => "web_use",
        }
    }
}

/// A single task for a specialized agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Which agent should run this task.
    #[serde(rename = "task_type")]
    pub kind: TaskKind,
    /// Natural language instructions for the agent.
    pub instructions: String,
    /// Unique identifier, assigned by the executor when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// An ordered batch of tasks plus the router's reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    /// Tasks to execute in order.
    pub tasks: Vec<Task>,
    /// Why these tasks are needed.
    pub reasoning: String,
}

/// A direct answer that needs no task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectReply {
    /// The final answer to the user's question.
    pub response: String,
    /// Why no tasks were needed.
    pub reasoning: String,
}

/// The router agent's decision on how to handle a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision_type", content = "content", rename_all = "snake_case")]
pub enum RouterDecision {
    /// Answer directly without running any agents.
    FinalResponse(DirectReply),
    /// Hand off to the task executor.
    TaskList(TaskList),
}

/// Result of executing a single task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// ID of the executed task.
    pub task_id: String,
    /// Kind of task that was executed.
    #[serde(rename = "task_type")]
    pub kind: TaskKind,
    /// Whether the task completed successfully.
    pub success: bool,
    /// Output from the task execution (empty on failure).
    pub result: String,
    /// Error message when the task failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock execution time in seconds.
    pub execution_time: f64,
}

/// Summary of a full executor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_tasks: usize,
    pub successful_tasks: usize,
    pub failed_tasks: usize,
    /// Per-task results, in execution order.
    pub results: Vec<TaskResult>,
    /// Total time for all tasks in seconds.
    pub total_execution_time: f64,
}

impl ExecutionSummary {
    /// Summary for an empty task list.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_tasks: 0,
            successful_tasks: 0,
            failed_tasks: 0,
            results: Vec::new(),
            total_execution_time: 0.0,
        }
    }
}

/// How a flow run concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    /// The router answered directly.
    DirectResponse,
    /// Tasks were executed and the answer synthesized.
    TaskExecution,
}

/// Complete result of one flow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowOutcome {
    pub flow_type: FlowType,
    /// The final response to return to the user.
    pub final_response: String,
    /// Execution summary when tasks were run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_summary: Option<ExecutionSummary>,
    /// Total time for the entire flow in seconds.
    pub total_time: f64,
    /// When the flow completed.
    pub timestamp: DateTime<Utc>,
}
