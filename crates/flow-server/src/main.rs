//! Backend HTTP service for the voice assistant.
//!
//! Wires the agent flow, session storage and text-to-speech behind a small
//! local API consumed by the desktop client.

mod config;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use flow_agents::{
    AiriaAgent, LlmClient, MinimaxTts, Orchestrator, RouterAgent, SynthesisAgent, TaskExecutor,
    WebUseAgent,
};
use flow_core::flow::TaskKind;
use flow_core::TranscriptStore;
use flow_session::storage::SqliteStore;
use flow_session::SessionManager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env().context("reading configuration")?;
    std::fs::create_dir_all(&config.data_dir).context("creating data directory")?;

    let llm_ready = config.anthropic_api_key.is_some();
    if !llm_ready {
        tracing::warn!("ANTHROPIC_API_KEY is not set; the flow will answer with errors");
    }
    let llm = LlmClient::new(config.anthropic_api_key.clone().unwrap_or_default())
        .context("building LLM client")?;

    let mut executor = TaskExecutor::new().with_agent(
        TaskKind::WebUse,
        Arc::new(WebUseAgent::new(llm.clone()).context("building web agent")?),
    );
    if let (Some(key), Some(pipeline)) = (&config.airia_api_key, &config.airia_pipeline_id) {
        executor = executor.with_agent(
            TaskKind::GoogleAssistant,
            Arc::new(AiriaAgent::new(key.clone(), pipeline.clone()).context("building Airia agent")?),
        );
    } else {
        tracing::warn!("Airia credentials missing; google_assistant tasks will fail");
    }

    let orchestrator = Arc::new(Orchestrator::new(
        RouterAgent::new(llm.clone()),
        executor,
        SynthesisAgent::new(llm),
    ));

    let tts = config
        .minimax_api_key
        .as_ref()
        .and_then(|key| MinimaxTts::new(key.clone()))
        .map(Arc::new);
    if tts.is_none() {
        tracing::info!("Text-to-speech disabled");
    }

    let store = SqliteStore::open(&config.db_path())
        .await
        .context("opening session database")?;
    let sessions = Arc::new(
        SessionManager::new(store, config.data_dir.clone()).context("creating session manager")?,
    );
    let session = sessions
        .get_or_create_default()
        .await
        .context("opening session")?;
    tracing::info!(session = %session.id, "Using session");
    Arc::clone(&sessions).spawn_cleanup_task(CLEANUP_INTERVAL, config.session_max_age);

    let app_state = AppState {
        orchestrator,
        transcript: Arc::new(TranscriptStore::new()),
        sessions,
        session_id: session.id,
        tts,
        llm_ready,
    };

    let app = routes::router(app_state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Backend listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
