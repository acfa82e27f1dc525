//! Core traits for task agents and session storage.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum commands kept per session before the oldest are dropped.
pub const COMMAND_HISTORY_LIMIT: usize = 50;

/// A persisted assistant session.
///
/// Sessions act as a key-value cache keyed by `id`: they track the working
/// data directory handed to the executing agents, a bounded command history
/// and the last URL the web agent landed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// Dedicated data directory for this session.
    pub data_dir: PathBuf,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: i64,
    /// Last access timestamp (Unix epoch seconds).
    pub last_accessed: i64,
    /// Recent commands, newest last, bounded to [`COMMAND_HISTORY_LIMIT`].
    pub command_history: Vec<String>,
    /// Last URL visited by a web task, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    /// Expired sessions are kept in storage but marked inactive.
    pub is_active: bool,
}

impl Session {
    /// Record a command, enforcing the history bound.
    pub fn push_command(&mut self, command: impl Into<String>) {
        self.command_history.push(command.into());
        if self.command_history.len() > COMMAND_HISTORY_LIMIT {
            let excess = self.command_history.len() - COMMAND_HISTORY_LIMIT;
            self.command_history.drain(..excess);
        }
    }
}

/// Storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Trait for session storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace a session record.
    async fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// Fetch an active session by ID.
    async fn get(&self, id: &str) -> Result<Option<Session>, StorageError>;

    /// List active sessions, most recently accessed first.
    async fn list_active(&self) -> Result<Vec<Session>, StorageError>;

    /// Mark every session last accessed before `cutoff` (epoch seconds) as
    /// inactive, returning the records that were expired.
    async fn expire_older_than(&self, cutoff: i64) -> Result<Vec<Session>, StorageError>;
}

/// Agent error.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Missing API credential: {0}")]
    MissingCredential(&'static str),
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Request timed out after {0:.2} seconds")]
    Timeout(f64),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// What a specialized agent returned for one task.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// The agent's output text.
    pub text: String,
    /// Final URL after the task, when the agent browsed somewhere.
    pub final_url: Option<String>,
}

impl AgentReply {
    /// Reply carrying only text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            final_url: None,
        }
    }
}

/// Trait for specialized task agents.
#[async_trait]
pub trait TaskAgent: Send + Sync {
    /// Execute one task described by natural language instructions.
    async fn run(&self, instructions: &str) -> Result<AgentReply, AgentError>;
}
