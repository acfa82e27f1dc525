//! Live transcription over the Gladia realtime API.
//!
//! A session is negotiated over HTTP, then raw PCM frames go out over a
//! websocket and transcript messages come back. Final utterances are
//! debounced on a speech pause before they reach the listener, so one
//! spoken sentence arrives as one transcript.

use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

const LIVE_ENDPOINT: &str = "https://api.gladia.io/v2/live";
const INIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause length that marks the end of a spoken sentence.
pub const SPEECH_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum GladiaError {
    #[error("Gladia API returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Gladia rate limit hit, retry after {retry_after}")]
    RateLimited { retry_after: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unexpected Gladia response: {0}")]
    Malformed(String),
    #[error("Transcription session error: {0}")]
    Session(String),
}

/// Audio parameters for a live session.
#[derive(Debug, Clone)]
pub struct GladiaSessionConfig {
    pub api_key: String,
    pub sample_rate: u32,
}

impl GladiaSessionConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            sample_rate: 16_000,
        }
    }
}

/// One transcript message from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    id: String,
    url: String,
}

/// A negotiated live transcription session.
pub struct GladiaSession {
    id: String,
    ws_url: String,
}

impl GladiaSession {
    /// Negotiate a new session and obtain its websocket URL.
    pub async fn init(config: &GladiaSessionConfig) -> Result<Self, GladiaError> {
        let http = reqwest::Client::builder()
            .timeout(INIT_TIMEOUT)
            .build()
            .map_err(|e| GladiaError::Transport(e.to_string()))?;

        let response = http
            .post(LIVE_ENDPOINT)
            .header("X-Gladia-Key", &config.api_key)
            .json(&json!({
                "encoding": "wav/pcm",
                "sample_rate": config.sample_rate,
                "bit_depth": 16,
                "channels": 1,
                "realtime_processing": {
                    "words_accurate_timestamps": true,
                },
            }))
            .send()
            .await
            .map_err(|e| GladiaError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_owned();
            return Err(GladiaError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GladiaError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let init: InitResponse = response
            .json()
            .await
            .map_err(|e| GladiaError::Malformed(e.to_string()))?;
        tracing::info!(session = %init.id, "Gladia session ready");
        Ok(Self {
            id: init.id,
            ws_url: init.url,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dial the session and pump audio out / transcripts in until either
    /// side closes.
    ///
    /// `audio_rx` carries raw little-endian 16-bit PCM frames. Debounced
    /// final sentences are delivered on `transcript_tx` with
    /// `is_final: true`; partials are forwarded as they arrive.
    pub async fn run(
        &self,
        mut audio_rx: mpsc::Receiver<Vec<u8>>,
        transcript_tx: mpsc::Sender<TranscriptEvent>,
    ) -> Result<(), GladiaError> {
        let (ws_stream, _) = connect_async(&self.ws_url)
            .await
            .map_err(|e| GladiaError::Transport(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let mut debouncer = FinalDebouncer::new(SPEECH_PAUSE);

        loop {
            let deadline = debouncer.deadline();
            let pause = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                frame = audio_rx.recv() => {
                    match frame {
                        Some(pcm) => {
                            write
                                .send(WsMessage::Binary(pcm))
                                .await
                                .map_err(|e| GladiaError::Transport(e.to_string()))?;
                        }
                        None => {
                            tracing::info!("Audio source closed, ending session");
                            let _ = write.send(WsMessage::Close(None)).await;
                            break;
                        }
                    }
                }
                () = pause => {
                    if let Some(sentence) = debouncer.flush() {
                        let event = TranscriptEvent { text: sentence, is_final: true };
                        if transcript_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            if let Some(message) = session_error(&text) {
                                return Err(GladiaError::Session(message));
                            }
                            if let Some(event) = parse_transcript(&text) {
                                if event.is_final {
                                    debouncer.push(&event.text, Instant::now());
                                } else if transcript_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Some(Ok(WsMessage::Ping(data))) => {
                            let _ = write.send(WsMessage::Pong(data)).await;
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            tracing::info!("Transcription socket closed");
                            break;
                        }
                        Some(Err(e)) => {
                            return Err(GladiaError::Transport(e.to_string()));
                        }
                        _ => {}
                    }
                }
            }
        }

        if let Some(sentence) = debouncer.flush() {
            let _ = transcript_tx
                .send(TranscriptEvent {
                    text: sentence,
                    is_final: true,
                })
                .await;
        }
        Ok(())
    }
}

/// Extract the error message from an `error` session message, if this is one.
fn session_error(text: &str) -> Option<String> {
    let message: Value = serde_json::from_str(text).ok()?;
    if message.get("type").and_then(Value::as_str) != Some("error") {
        return None;
    }
    Some(
        message
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error")
            .to_owned(),
    )
}

/// Parse one websocket message into a transcript event, ignoring session
/// lifecycle chatter.
fn parse_transcript(text: &str) -> Option<TranscriptEvent> {
    let message: Value = serde_json::from_str(text).ok()?;
    if message.get("type").and_then(Value::as_str) != Some("transcript") {
        return None;
    }
    let data = message.get("data")?;
    let utterance = data
        .get("utterance")
        .and_then(|u| u.get("text"))
        .and_then(Value::as_str)?
        .trim();
    if utterance.is_empty() {
        return None;
    }
    Some(TranscriptEvent {
        text: utterance.to_owned(),
        is_final: data.get("is_final").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Holds the latest final utterance until a pause with no further speech.
///
/// Gladia finals for one utterance are cumulative, so a newer final
/// replaces the buffer rather than appending to it.
#[derive(Debug)]
struct FinalDebouncer {
    pause: Duration,
    buffered: Option<String>,
    last_final: Option<Instant>,
}

impl FinalDebouncer {
    const fn new(pause: Duration) -> Self {
        Self {
            pause,
            buffered: None,
            last_final: None,
        }
    }

    fn push(&mut self, text: &str, now: Instant) {
        self.buffered = Some(text.to_owned());
        self.last_final = Some(now);
    }

    /// When the buffered sentence should be released, if anything is buffered.
    fn deadline(&self) -> Option<Instant> {
        self.last_final.map(|at| at + self.pause)
    }

    fn flush(&mut self) -> Option<String> {
        self.last_final = None;
        self.buffered.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_final_transcript_message() {
        let msg = r#"{
            "type": "transcript",
            "data": {
                "is_final": true,
                "utterance": {"text": " hey flow what time is it "}
            }
        }"#;
        let event = parse_transcript(msg).unwrap();
        assert!(event.is_final);
        assert_eq!(event.text, "hey flow what time is it");
    }

    #[test]
    fn partial_transcripts_are_marked() {
        let msg = r#"{"type": "transcript", "data": {"is_final": false, "utterance": {"text": "hey"}}}"#;
        let event = parse_transcript(msg).unwrap();
        assert!(!event.is_final);
    }

    #[test]
    fn lifecycle_messages_are_ignored() {
        assert!(parse_transcript(r#"{"type": "audio_chunk", "acknowledged": true}"#).is_none());
        assert!(parse_transcript("not json at all").is_none());
        assert!(parse_transcript(
            r#"{"type": "transcript", "data": {"is_final": true, "utterance": {"text": "  "}}}"#
        )
        .is_none());
    }

    #[test]
    fn debouncer_keeps_latest_final_and_resets_timer() {
        let mut debouncer = FinalDebouncer::new(Duration::from_secs(1));
        let t0 = Instant::now();
        debouncer.push("hey flow", t0);
        debouncer.push("hey flow what's the weather", t0 + Duration::from_millis(400));

        assert_eq!(
            debouncer.deadline(),
            Some(t0 + Duration::from_millis(1400))
        );
        assert_eq!(
            debouncer.flush().as_deref(),
            Some("hey flow what's the weather")
        );
        assert!(debouncer.deadline().is_none());
        assert!(debouncer.flush().is_none());
    }

    #[test]
    fn error_messages_are_extracted() {
        assert_eq!(
            session_error(r#"{"type": "error", "message": "invalid sample rate"}"#).as_deref(),
            Some("invalid sample rate")
        );
        assert!(session_error(r#"{"type": "transcript"}"#).is_none());
    }
}
