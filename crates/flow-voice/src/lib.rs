//! Voice front end for the assistant.
//!
//! Turns a live microphone transcript into backend messages: the Gladia
//! realtime API produces transcripts, the wake word detector decides which
//! of them are commands, and the backend client delivers them.

pub mod backend;
pub mod gladia;
pub mod listener;
pub mod wake;

pub use backend::{BackendClient, BackendReply, HealthReport};
pub use gladia::{GladiaSession, GladiaSessionConfig, TranscriptEvent};
pub use listener::{CommandListener, VoiceEvent};
pub use wake::{WakeDetection, WakeWord};
