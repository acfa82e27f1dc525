//! In-memory session storage.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use flow_core::traits::{Session, SessionStore, StorageError};

/// In-memory storage implementation.
///
/// Useful for development and tests. Data is lost on restart.
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    /// Create a new in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, session: &Session) -> Result<(), StorageError> {
        self.sessions
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self
            .sessions
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .get(id)
            .filter(|s| s.is_active)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Session>, StorageError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let mut result: Vec<Session> = sessions.values().filter(|s| s.is_active).cloned().collect();

        // Sort by last_accessed descending
        result.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        Ok(result)
    }

    async fn expire_older_than(&self, cutoff: i64) -> Result<Vec<Session>, StorageError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let mut expired = Vec::new();
        for session in sessions.values_mut() {
            if session.is_active && session.last_accessed < cutoff {
                session.is_active = false;
                expired.push(session.clone());
            }
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn session(id: &str, last_accessed: i64) -> Session {
        Session {
            id: id.into(),
            data_dir: PathBuf::from("/tmp").join(id),
            created_at: last_accessed,
            last_accessed,
            command_history: Vec::new(),
            current_url: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn list_orders_by_last_access() {
        let store = MemoryStore::new();
        store.save(&session("old", 100)).await.unwrap();
        store.save(&session("new", 200)).await.unwrap();

        let active = store.list_active().await.unwrap();
        assert_eq!(active[0].id, "new");
        assert_eq!(active[1].id, "old");
    }

    #[tokio::test]
    async fn expiry_hides_sessions() {
        let store = MemoryStore::new();
        store.save(&session("stale", 100)).await.unwrap();
        store.save(&session("fresh", 200)).await.unwrap();

        let expired = store.expire_older_than(150).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, "stale");

        assert!(store.get("stale").await.unwrap().is_none());
        assert!(store.get("fresh").await.unwrap().is_some());
    }
}
