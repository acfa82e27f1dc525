//! Sequential task executor.
//!
//! Runs each task from a routing decision against the agent registered for
//! its kind. A failing task is recorded and execution continues; the
//! synthesis stage decides how to present partial results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use flow_core::flow::{ExecutionSummary, Task, TaskKind, TaskResult};
use flow_core::traits::TaskAgent;
use uuid::Uuid;

/// Dispatches tasks to the agents registered per [`TaskKind`].
pub struct TaskExecutor {
    agents: HashMap<TaskKind, Arc<dyn TaskAgent>>,
}

impl TaskExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register the agent handling a task kind, replacing any previous one.
    #[must_use]
    pub fn with_agent(mut self, kind: TaskKind, agent: Arc<dyn TaskAgent>) -> Self {
        self.agents.insert(kind, agent);
        self
    }

    #[must_use]
    pub fn supported_kinds(&self) -> Vec<TaskKind> {
        self.agents.keys().copied().collect()
    }

    /// Execute the tasks in order and collect their results.
    pub async fn execute(&self, tasks: &[Task]) -> ExecutionSummary {
        if tasks.is_empty() {
            return ExecutionSummary::empty();
        }

        tracing::info!(count = tasks.len(), "Executing task list");
        let started = Instant::now();
        let mut results = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let task_id = task
                .task_id
                .clone()
                .unwrap_or_else(|| generated_task_id(index));
            results.push(self.run_one(&task_id, task).await);
        }

        let successful = results.iter().filter(|r| r.success).count();
        let summary = ExecutionSummary {
            total_tasks: tasks.len(),
            successful_tasks: successful,
            failed_tasks: tasks.len() - successful,
            results,
            total_execution_time: started.elapsed().as_secs_f64(),
        };
        tracing::info!(
            successful = summary.successful_tasks,
            failed = summary.failed_tasks,
            elapsed = summary.total_execution_time,
            "Task execution finished"
        );
        summary
    }

    async fn run_one(&self, task_id: &str, task: &Task) -> TaskResult {
        let started = Instant::now();
        tracing::info!(task_id, kind = task.kind.as_str(), "Running task");

        let Some(agent) = self.agents.get(&task.kind) else {
            return TaskResult {
                task_id: task_id.to_owned(),
                kind: task.kind,
                success: false,
                result: String::new(),
                error_message: Some(format!("No agent registered for {}", task.kind.as_str())),
                execution_time: started.elapsed().as_secs_f64(),
            };
        };

        match agent.run(&task.instructions).await {
            Ok(reply) => TaskResult {
                task_id: task_id.to_owned(),
                kind: task.kind,
                success: true,
                result: reply.text,
                error_message: None,
                execution_time: started.elapsed().as_secs_f64(),
            },
            Err(e) => {
                tracing::error!(task_id, "Task failed: {e}");
                TaskResult {
                    task_id: task_id.to_owned(),
                    kind: task.kind,
                    success: false,
                    result: String::new(),
                    error_message: Some(e.to_string()),
                    execution_time: started.elapsed().as_secs_f64(),
                }
            }
        }
    }
}

impl Default for TaskExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn generated_task_id(index: usize) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("task_{index}_{}", &uuid[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flow_core::traits::{AgentError, AgentReply};

    struct EchoAgent;

    #[async_trait]
    impl TaskAgent for EchoAgent {
        async fn run(&self, instructions: &str) -> Result<AgentReply, AgentError> {
            Ok(AgentReply::text(format!("done: {instructions}")))
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl TaskAgent for FailingAgent {
        async fn run(&self, _instructions: &str) -> Result<AgentReply, AgentError> {
            Err(AgentError::Timeout(30.0))
        }
    }

    fn task(kind: TaskKind, instructions: &str) -> Task {
        Task {
            kind,
            instructions: instructions.into(),
            task_id: None,
        }
    }

    #[tokio::test]
    async fn empty_task_list_yields_empty_summary() {
        let executor = TaskExecutor::new();
        let summary = executor.execute(&[]).await;
        assert_eq!(summary.total_tasks, 0);
        assert!(summary.results.is_empty());
    }

    #[tokio::test]
    async fn failures_do_not_stop_later_tasks() {
        let executor = TaskExecutor::new()
            .with_agent(TaskKind::WebUse, Arc::new(FailingAgent))
            .with_agent(TaskKind::GoogleAssistant, Arc::new(EchoAgent));

        let tasks = [
            task(TaskKind::WebUse, "search something"),
            task(TaskKind::GoogleAssistant, "check calendar"),
        ];
        let summary = executor.execute(&tasks).await;

        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.successful_tasks, 1);
        assert_eq!(summary.failed_tasks, 1);
        assert!(!summary.results[0].success);
        assert!(summary.results[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("timed out"));
        assert!(summary.results[1].result.contains("check calendar"));
    }

    #[tokio::test]
    async fn unregistered_kind_is_a_failed_result() {
        let executor = TaskExecutor::new();
        let summary = executor.execute(&[task(TaskKind::WebUse, "anything")]).await;
        assert_eq!(summary.failed_tasks, 1);
        assert!(summary.results[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("No agent registered"));
    }

    #[tokio::test]
    async fn generated_ids_carry_position() {
        let executor = TaskExecutor::new().with_agent(TaskKind::WebUse, Arc::new(EchoAgent));
        let tasks = [task(TaskKind::WebUse, "a"), task(TaskKind::WebUse, "b")];
        let summary = executor.execute(&tasks).await;
        assert!(summary.results[0].task_id.starts_with("task_0_"));
        assert!(summary.results[1].task_id.starts_with("task_1_"));
    }
}
