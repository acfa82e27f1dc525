//! Environment-driven configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_SESSION_MAX_AGE_HOURS: u64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid FLOW_BIND address: {0}")]
    BadBindAddr(String),
    #[error("Invalid FLOW_SESSION_MAX_AGE_HOURS: {0}")]
    BadMaxAge(String),
}

/// Server configuration, read from the environment.
///
/// API keys are optional on purpose: components without a key come up
/// degraded and `/health` reports them, instead of the server refusing to
/// start.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub anthropic_api_key: Option<String>,
    pub airia_api_key: Option<String>,
    pub airia_pipeline_id: Option<String>,
    pub minimax_api_key: Option<String>,
    /// Base directory for session state and the sqlite database.
    pub data_dir: PathBuf,
    pub session_max_age: Duration,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env_var("FLOW_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_owned())
            .parse()
            .map_err(|_| ConfigError::BadBindAddr(env_var("FLOW_BIND").unwrap_or_default()))?;

        let data_dir = env_var("FLOW_DATA_DIR").map_or_else(
            || {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("control-flow")
            },
            PathBuf::from,
        );

        let max_age_hours = match env_var("FLOW_SESSION_MAX_AGE_HOURS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::BadMaxAge(raw))?,
            None => DEFAULT_SESSION_MAX_AGE_HOURS,
        };

        Ok(Self {
            bind_addr,
            anthropic_api_key: env_var("ANTHROPIC_API_KEY"),
            airia_api_key: env_var("AIRIA_API_KEY"),
            airia_pipeline_id: env_var("AIRIA_PIPELINE_ID"),
            minimax_api_key: env_var("MINIMAX_API_KEY"),
            data_dir,
            session_max_age: Duration::from_secs(max_age_hours * 3600),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("sessions.db")
    }
}
