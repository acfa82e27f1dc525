//! Command capture state machine.
//!
//! Sits between the transcript stream and the backend: a wake phrase with
//! trailing speech yields a payload immediately, a bare wake phrase arms a
//! capture window and the next utterance becomes the payload. "Hey flow"
//! payloads are commands for the agent flow; "orange" payloads are
//! dictation. Transcripts are dropped while the backend is still answering
//! the previous command.

use std::time::{Duration, Instant};

use crate::wake::{self, WakeWord};

/// How long a bare wake phrase waits for the follow-up payload.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// What the listener decided about a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// A complete command, ready for the backend.
    Command(String),
    /// Text to type where the cursor is.
    Dictation(String),
    /// A bare wake phrase armed the capture window.
    Armed(WakeWord),
}

/// Turns final transcripts into commands and dictation.
#[derive(Debug, Default)]
pub struct CommandListener {
    armed: Option<(WakeWord, Instant)>,
    busy: bool,
}

impl CommandListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress or resume transcript handling while a command is in flight.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if busy {
            self.armed = None;
        }
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Feed one final transcript; `now` is when it arrived.
    pub fn on_final_transcript(&mut self, text: &str, now: Instant) -> Option<VoiceEvent> {
        if self.busy {
            tracing::debug!("Dropping transcript while busy: {text}");
            return None;
        }

        if let Some((word, armed_at)) = self.armed {
            self.armed = None;
            if now.duration_since(armed_at) <= CAPTURE_TIMEOUT {
                let payload = text.trim().trim_start_matches([',', '!', '.']).trim_start();
                if !payload.is_empty() {
                    tracing::info!(?word, "Captured payload: {payload}");
                    return Some(event_for(word, payload.to_owned()));
                }
                return None;
            }
            tracing::debug!("Capture window expired");
        }

        let detection = wake::detect(text)?;
        match detection.payload {
            Some(payload) => {
                tracing::info!(word = ?detection.word, "Wake phrase with payload: {payload}");
                Some(event_for(detection.word, payload))
            }
            None => {
                tracing::info!(word = ?detection.word, "Wake phrase armed, waiting for payload");
                self.armed = Some((detection.word, now));
                Some(VoiceEvent::Armed(detection.word))
            }
        }
    }
}

const fn event_for(word: WakeWord, payload: String) -> VoiceEvent {
    match word {
        WakeWord::HeyFlow => VoiceEvent::Command(payload),
        WakeWord::Orange => VoiceEvent::Dictation(payload),
    }
}
