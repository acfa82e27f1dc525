//! SQLite session storage (feature-gated).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flow_core::traits::{Session, SessionStore, StorageError};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteRow},
};

/// SQLite storage implementation backed by a single `sessions` table.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run the schema.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrated.
    pub async fn open(db_path: &Path) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StorageError::Internal(format!("open {}: {e}", db_path.display())))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                data_dir TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_accessed INTEGER NOT NULL,
                command_history TEXT,
                current_url TEXT,
                is_active INTEGER DEFAULT 1
            )
            ",
        )
        .execute(&pool)
        .await
        .map_err(internal)?;

        Ok(Self { pool })
    }

    fn from_row(row: &SqliteRow) -> Result<Session, StorageError> {
        let history: Option<String> = row.try_get("command_history").map_err(internal)?;
        let command_history = match history.as_deref() {
            Some(json) if !json.is_empty() => {
                serde_json::from_str(json).map_err(|e| StorageError::Internal(e.to_string()))?
            }
            _ => Vec::new(),
        };

        let data_dir: String = row.try_get("data_dir").map_err(internal)?;

        Ok(Session {
            id: row.try_get("session_id").map_err(internal)?,
            data_dir: PathBuf::from(data_dir),
            created_at: row.try_get("created_at").map_err(internal)?,
            last_accessed: row.try_get("last_accessed").map_err(internal)?,
            command_history,
            current_url: row.try_get("current_url").map_err(internal)?,
            is_active: row.try_get::<i64, _>("is_active").map_err(internal)? != 0,
        })
    }
}

fn internal(e: impl std::fmt::Display) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let history =
            serde_json::to_string(&session.command_history).map_err(internal)?;

        sqlx::query(
            r"
            INSERT OR REPLACE INTO sessions
            (session_id, data_dir, created_at, last_accessed, command_history, current_url, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&session.id)
        .bind(session.data_dir.to_string_lossy().into_owned())
        .bind(session.created_at)
        .bind(session.last_accessed)
        .bind(history)
        .bind(&session.current_url)
        .bind(i64::from(session.is_active))
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE session_id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Session>, StorageError> {
        let rows =
            sqlx::query("SELECT * FROM sessions WHERE is_active = 1 ORDER BY last_accessed DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn expire_older_than(&self, cutoff: i64) -> Result<Vec<Session>, StorageError> {
        let rows =
            sqlx::query("SELECT * FROM sessions WHERE is_active = 1 AND last_accessed < ?")
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;

        let expired: Vec<Session> = rows.iter().map(Self::from_row).collect::<Result<_, _>>()?;

        sqlx::query("UPDATE sessions SET is_active = 0 WHERE is_active = 1 AND last_accessed < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(internal)?;

        Ok(expired)
    }
}
