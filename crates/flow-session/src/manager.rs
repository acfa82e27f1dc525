//! Session manager: creation, command tracking and time-based expiry.

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use chrono::Utc;
use flow_core::traits::{Session, SessionStore, StorageError};

/// Default maximum session age before cleanup (24 hours).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Session manager error.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Manages persistent sessions with automatic cleanup.
pub struct SessionManager<S>
where
    S: SessionStore,
{
    store: S,
    sessions_dir: PathBuf,
}

impl<S> SessionManager<S>
where
    S: SessionStore,
{
    /// Create a new manager rooted at `base_dir`.
    ///
    /// # Errors
    /// Returns error if the sessions directory cannot be created.
    pub fn new(store: S, base_dir: PathBuf) -> Result<Self, ManagerError> {
        let sessions_dir = base_dir.join("sessions");
        std::fs::create_dir_all(&sessions_dir)?;
        Ok(Self {
            store,
            sessions_dir,
        })
    }

    /// Create a new session, generating an id when none is given.
    ///
    /// # Errors
    /// Returns error if the data directory or storage write fails.
    pub async fn create(&self, id: Option<String>) -> Result<Session, ManagerError> {
        let id = id.unwrap_or_else(|| {
            format!(
                "session_{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                std::process::id()
            )
        });

        let data_dir = self.sessions_dir.join(&id);
        std::fs::create_dir_all(&data_dir)?;

        let timestamp = now();
        let session = Session {
            id,
            data_dir,
            created_at: timestamp,
            last_accessed: timestamp,
            command_history: Vec::new(),
            current_url: None,
            is_active: true,
        };

        self.store.save(&session).await?;
        Ok(session)
    }

    /// Fetch an active session.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub async fn get(&self, id: &str) -> Result<Option<Session>, ManagerError> {
        Ok(self.store.get(id).await?)
    }

    /// The most recently accessed active session, or a fresh `"default"` one.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub async fn get_or_create_default(&self) -> Result<Session, ManagerError> {
        let sessions = self.store.list_active().await?;
        match sessions.into_iter().next() {
            Some(session) => Ok(session),
            None => self.create(Some("default".into())).await,
        }
    }

    /// Record a command against a session, updating its access time and
    /// optionally its current URL. Unknown sessions are ignored.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub async fn record_command(
        &self,
        id: &str,
        command: &str,
        url: Option<&str>,
    ) -> Result<(), ManagerError> {
        let Some(mut session) = self.store.get(id).await? else {
            return Ok(());
        };

        session.push_command(command);
        if let Some(url) = url {
            session.current_url = Some(url.to_string());
        }
        session.last_accessed = now();

        self.store.save(&session).await?;
        Ok(())
    }

    /// Expire sessions older than `max_age` and remove their data
    /// directories. Directory removal is best-effort.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub async fn cleanup_expired(&self, max_age: Duration) -> Result<usize, ManagerError> {
        let cutoff = now() - max_age.as_secs() as i64;
        let expired = self.store.expire_older_than(cutoff).await?;

        for session in &expired {
            if session.data_dir.exists() {
                if let Err(e) = std::fs::remove_dir_all(&session.data_dir) {
                    tracing::warn!(
                        session = %session.id,
                        dir = %session.data_dir.display(),
                        "Could not remove session data dir: {e}"
                    );
                }
            }
        }

        if !expired.is_empty() {
            tracing::info!("Cleaned up {} old sessions", expired.len());
        }
        Ok(expired.len())
    }

    /// Spawn a background task that sweeps expired sessions on an interval.
    pub fn spawn_cleanup_task(
        self: Arc<Self>,
        interval: Duration,
        max_age: Duration,
    ) -> tokio::task::JoinHandle<()>
    where
        S: 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                if let Err(e) = self.cleanup_expired(max_age).await {
                    tracing::error!("Session cleanup error: {e}");
                }
            }
        })
    }
}
