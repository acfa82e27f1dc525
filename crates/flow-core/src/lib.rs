//! Core abstractions for the Control Flow voice assistant.
//!
//! This crate provides the fundamental building blocks:
//! - Flow data model (`RouterDecision`, `Task`, `ExecutionSummary`, ...)
//! - `TranscriptStore` - Broadcast + history for the conversation transcript
//! - `TaskAgent` and `SessionStore` traits

pub mod flow;
pub mod traits;
pub mod transcript;

pub use flow::{
    DirectReply, ExecutionSummary, FlowOutcome, FlowType, RouterDecision, Task, TaskKind, TaskList,
    TaskResult,
};
pub use traits::{AgentError, AgentReply, Session, SessionStore, StorageError, TaskAgent};
pub use transcript::{TranscriptStore, Turn};
