//! Agent pipeline for the Control Flow assistant.
//!
//! Provides:
//! - `LlmClient` - Anthropic Messages API wrapper with structured output
//! - `RouterAgent` / `SynthesisAgent` - the two LLM stages of the flow
//! - `TaskExecutor` - sequential task execution over `TaskAgent`s
//! - `AiriaAgent` / `WebUseAgent` - the specialized task agents
//! - `MinimaxTts` - best-effort text-to-speech
//! - `Orchestrator` - route, execute, synthesize

pub mod assistant;
pub mod executor;
pub mod llm;
pub mod orchestrator;
pub mod router;
pub mod synthesis;
pub mod tts;
pub mod web;

pub use assistant::AiriaAgent;
pub use executor::TaskExecutor;
pub use llm::{ChatMessage, LlmClient, Role};
pub use orchestrator::Orchestrator;
pub use router::RouterAgent;
pub use synthesis::{SynthesisAgent, SynthesisReply};
pub use tts::MinimaxTts;
pub use web::WebUseAgent;
