//! Text-to-speech via the MiniMax HTTP API.
//!
//! Speech is a garnish on the message flow: every failure here is logged
//! and swallowed so the text response still reaches the user.

use std::time::Duration;

use serde_json::{json, Value};

use crate::router::truncate;

const DEFAULT_BASE_URL: &str = "https://api.minimax.io";
const DEFAULT_VOICE_ID: &str = "English_expressive_narrator";
const MODEL: &str = "speech-02-turbo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// The API rejects texts beyond this length.
const MAX_TEXT_CHARS: usize = 10_000;

/// MiniMax text-to-speech client returning hosted audio URLs.
pub struct MinimaxTts {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
}

impl MinimaxTts {
    pub fn new(api_key: impl Into<String>) -> Option<Self> {
        let http = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
            Ok(http) => http,
            Err(e) => {
                tracing::warn!("TTS client unavailable: {e}");
                return None;
            }
        };
        Some(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            voice_id: DEFAULT_VOICE_ID.to_owned(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Synthesize `text` and return the hosted audio URL, or `None` on any
    /// failure.
    pub async fn synthesize(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let text = truncate(text, MAX_TEXT_CHARS);

        let url = format!("{}/v1/t2a_v2", self.base_url);
        let payload = request_payload(&self.voice_id, text);

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("TTS request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "TTS request rejected");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("TTS response unreadable: {e}");
                return None;
            }
        };

        let audio_url = extract_audio_url(&body);
        if audio_url.is_none() {
            tracing::warn!("TTS response carried no audio URL");
        }
        audio_url
    }
}

fn request_payload(voice_id: &str, text: &str) -> Value {
    json!({
        "model": MODEL,
        "text": text,
        "stream": false,
        "output_format": "url",
        "voice_setting": {
            "voice_id": voice_id,
            "speed": 1.4,
            "vol": 1.0,
            "pitch": 0,
        },
        "audio_setting": {
            "audio_sample_rate": 32000,
            "bitrate": 128_000,
            "format": "mp3",
            "channel": 1,
        },
    })
}

/// Probe the response for the audio URL across the shapes the API emits.
fn extract_audio_url(body: &Value) -> Option<String> {
    if let Some(url) = body.get("audio_url").and_then(Value::as_str) {
        return Some(url.to_owned());
    }
    if let Some(data) = body.get("data") {
        for key in ["audio_url", "audio"] {
            if let Some(url) = data.get(key).and_then(Value::as_str) {
                return Some(url.to_owned());
            }
        }
    }
    for key in ["audio", "url"] {
        if let Some(url) = body.get(key).and_then(Value::as_str) {
            return Some(url.to_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_top_level_audio_url() {
        let body = json!({"audio_url": "https://cdn.example/a.mp3"});
        assert_eq!(
            extract_audio_url(&body).as_deref(),
            Some("https://cdn.example/a.mp3")
        );
    }

    #[test]
    fn probes_nested_data_keys() {
        let body = json!({"data": {"audio_url": "https://cdn.example/b.mp3"}});
        assert_eq!(
            extract_audio_url(&body).as_deref(),
            Some("https://cdn.example/b.mp3")
        );

        let body = json!({"data": {"audio": "https://cdn.example/c.mp3"}});
        assert_eq!(
            extract_audio_url(&body).as_deref(),
            Some("https://cdn.example/c.mp3")
        );
    }

    #[test]
    fn payload_uses_documented_wire_keys() {
        let payload = request_payload("Narrator", "hello");
        assert_eq!(payload["model"], MODEL);
        assert_eq!(payload["voice_setting"]["voice_id"], "Narrator");
        assert_eq!(payload["audio_setting"]["audio_sample_rate"], 32000);
        assert_eq!(payload["audio_setting"]["format"], "mp3");
        assert!(payload["audio_setting"].get("sample_rate").is_none());
    }

    #[test]
    fn missing_url_yields_none() {
        let body = json!({"status": "ok"});
        assert_eq!(extract_audio_url(&body), None);
    }
}
