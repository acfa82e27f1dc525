//! HTTP endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use flow_agents::ChatMessage;
use flow_core::Turn;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/message", axum::routing::post(message))
        .route("/health", get(health))
        .route("/conversation", get(conversation).delete(clear_conversation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": "control-flow backend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /message": "run a command through the agent flow",
            "GET /health": "component health",
            "GET /conversation": "conversation transcript",
            "DELETE /conversation": "clear the transcript",
        },
    }))
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    #[serde(default)]
    message: String,
}

async fn message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> impl IntoResponse {
    let text = request.message.trim();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "message must not be empty"})),
        );
    }

    tracing::info!(message = %text, "Handling message");
    let history = conversation_context(&state);
    state.transcript.push_user(text);

    if let Err(e) = state
        .sessions
        .record_command(&state.session_id, text, None)
        .await
    {
        tracing::warn!("Failed to record command: {e}");
    }

    let outcome = state.orchestrator.handle(text, &history).await;
    state.transcript.push_assistant(outcome.final_response.clone());

    let audio_url = match &state.tts {
        Some(tts) => tts.synthesize(&outcome.final_response).await,
        None => None,
    };

    // Flow errors surface as apologetic responses, not HTTP failures; the
    // desktop client keys off the status field.
    let status = if outcome.final_response.starts_with("I apologize") {
        "error"
    } else {
        "success"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "response": outcome.final_response,
            "execution_time": outcome.total_time,
            "timestamp": outcome.timestamp.to_rfc3339(),
            "audio_url": audio_url,
        })),
    )
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let status = if state.llm_ready { "healthy" } else { "degraded" };
    Json(json!({
        "status": status,
        "model_initialized": state.llm_ready,
        "api_key_present": state.llm_ready,
        "conversation_length": state.transcript.message_count(),
        "a2a_flow_enabled": true,
        "a2a_components": state.orchestrator.component_status(),
    }))
}

async fn conversation(State(state): State<AppState>) -> Json<Value> {
    let turns = state.transcript.get_history();
    Json(json!({
        "length": turns.iter().filter(|t| t.is_message()).count(),
        "turns": turns,
    }))
}

async fn clear_conversation(State(state): State<AppState>) -> Json<Value> {
    state.transcript.clear();
    tracing::info!("Conversation cleared");
    Json(json!({"status": "cleared"}))
}

/// Conversation history as LLM messages, oldest first.
fn conversation_context(state: &AppState) -> Vec<ChatMessage> {
    state
        .transcript
        .get_history()
        .into_iter()
        .filter_map(|turn| match turn {
            Turn::User(text) => Some(ChatMessage::user(text)),
            Turn::Assistant(text) => Some(ChatMessage::assistant(text)),
            Turn::Status(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_deserializes_to_default() {
        let request: MessageRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_empty());
    }
}
