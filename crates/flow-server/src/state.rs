//! Shared application state.

use std::sync::Arc;

use flow_agents::{MinimaxTts, Orchestrator};
use flow_core::TranscriptStore;
use flow_session::storage::SqliteStore;
use flow_session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub transcript: Arc<TranscriptStore>,
    pub sessions: Arc<SessionManager<SqliteStore>>,
    /// Session all backend commands are recorded under.
    pub session_id: String,
    pub tts: Option<Arc<MinimaxTts>>,
    /// Whether an LLM API key was configured at startup.
    pub llm_ready: bool,
}
