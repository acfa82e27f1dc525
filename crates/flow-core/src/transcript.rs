//! Broadcast + history store for the conversation transcript.

use std::{collections::VecDeque, sync::RwLock};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Default history size limit (1 MB of transcript text).
const HISTORY_BYTES: usize = 1024 * 1024;

/// One turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Turn {
    /// Something the user said.
    User(String),
    /// An assistant reply.
    Assistant(String),
    /// Transient status line ("Listening for command...").
    Status(String),
}

impl Turn {
    fn approx_bytes(&self) -> usize {
        match self {
            Self::User(s) | Self::Assistant(s) | Self::Status(s) => s.len() + 16,
        }
    }

    /// Whether this turn counts toward the conversation proper.
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self, Self::User(_) | Self::Assistant(_))
    }
}

#[derive(Clone)]
struct StoredTurn {
    turn: Turn,
    bytes: usize,
}

struct Inner {
    history: VecDeque<StoredTurn>,
    total_bytes: usize,
}

/// Transcript store with broadcast and history support.
///
/// Frontends that reconnect receive the history first and then switch
/// seamlessly to live turns.
pub struct TranscriptStore {
    inner: RwLock<Inner>,
    sender: broadcast::Sender<Turn>,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptStore {
    /// Create a new transcript store.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self {
            inner: RwLock::new(Inner {
                history: VecDeque::with_capacity(32),
                total_bytes: 0,
            }),
            sender,
        }
    }

    /// Push a turn to both live listeners and history.
    pub fn push(&self, turn: Turn) {
        let _ = self.sender.send(turn.clone()); // live listeners
        let bytes = turn.approx_bytes();

        let mut inner = self.inner.write().unwrap();
        while inner.total_bytes.saturating_add(bytes) > HISTORY_BYTES {
            if let Some(front) = inner.history.pop_front() {
                inner.total_bytes = inner.total_bytes.saturating_sub(front.bytes);
            } else {
                break;
            }
        }
        inner.history.push_back(StoredTurn { turn, bytes });
        inner.total_bytes = inner.total_bytes.saturating_add(bytes);
    }

    /// Push a user message.
    pub fn push_user<S: Into<String>>(&self, s: S) {
        self.push(Turn::User(s.into()));
    }

    /// Push an assistant reply.
    pub fn push_assistant<S: Into<String>>(&self, s: S) {
        self.push(Turn::Assistant(s.into()));
    }

    /// Push a status line.
    pub fn push_status<S: Into<String>>(&self, s: S) {
        self.push(Turn::Status(s.into()));
    }

    /// Get a receiver for live updates.
    #[must_use]
    pub fn get_receiver(&self) -> broadcast::Receiver<Turn> {
        self.sender.subscribe()
    }

    /// Get a snapshot of the history.
    #[must_use]
    pub fn get_history(&self) -> Vec<Turn> {
        self.inner
            .read()
            .unwrap()
            .history
            .iter()
            .map(|s| s.turn.clone())
            .collect()
    }

    /// Number of user/assistant messages in the history.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner
            .read()
            .unwrap()
            .history
            .iter()
            .filter(|s| s.turn.is_message())
            .count()
    }

    /// Drop the recorded history. Live receivers are unaffected.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.history.clear();
        inner.total_bytes = 0;
    }

    /// Stream that yields history first, then live updates.
    #[must_use]
    pub fn history_plus_stream(
        &self,
    ) -> futures::stream::BoxStream<'static, Result<Turn, std::io::Error>> {
        let (history, rx) = (self.get_history(), self.get_receiver());

        let hist = futures::stream::iter(history.into_iter().map(Ok::<_, std::io::Error>));
        let live = BroadcastStream::new(rx)
            .filter_map(|res: Result<Turn, _>| async move { res.ok().map(Ok::<_, std::io::Error>) });

        Box::pin(hist.chain(live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_preserves_order() {
        let store = TranscriptStore::new();
        store.push_user("what is the capital of France?");
        store.push_status("Routing request...");
        store.push_assistant("Paris.");

        let history = store.get_history();
        assert_eq!(history.len(), 3);
        assert!(matches!(&history[0], Turn::User(s) if s.contains("France")));
        assert!(matches!(&history[2], Turn::Assistant(s) if s == "Paris."));
        assert_eq!(store.message_count(), 2);
    }

    #[test]
    fn clear_empties_history() {
        let store = TranscriptStore::new();
        store.push_user("hello");
        store.push_assistant("hi");
        store.clear();
        assert!(store.get_history().is_empty());
        assert_eq!(store.message_count(), 0);
    }

    #[test]
    fn byte_cap_evicts_oldest() {
        let store = TranscriptStore::new();
        // Each turn is ~64 KB; 20 of them exceed the 1 MB cap.
        let big = "x".repeat(64 * 1024);
        for i in 0..20 {
            store.push_user(format!("{i}:{big}"));
        }
        let history = store.get_history();
        assert!(history.len() < 20);
        // The first turns are the ones evicted.
        assert!(matches!(&history[0], Turn::User(s) if !s.starts_with("0:")));
    }

    #[tokio::test]
    async fn live_receiver_sees_new_turns() {
        let store = TranscriptStore::new();
        let mut rx = store.get_receiver();
        store.push_assistant("done");
        let turn = rx.recv().await.unwrap();
        assert!(matches!(turn, Turn::Assistant(s) if s == "done"));
    }

    #[tokio::test]
    async fn history_plus_stream_replays_then_follows() {
        let store = TranscriptStore::new();
        store.push_user("earlier");

        let mut stream = store.history_plus_stream();
        store.push_assistant("later");

        let first = stream.next().await.unwrap().unwrap();
        assert!(matches!(first, Turn::User(s) if s == "earlier"));
        let second = stream.next().await.unwrap().unwrap();
        assert!(matches!(second, Turn::Assistant(s) if s == "later"));
    }
}
