//! Route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use barista_chat::{ChatRequest, ChatResponseBody, SessionStore};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Chat
// =============================================================================

/// POST /chat - answer one message.
///
/// Always 200 with `{reply}` unless the message exceeds the configured
/// maximum length.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let max = state.config.chat.max_message_length;
    if req.message.len() > max {
        return Err(ApiError::BadRequest(format!(
            "message exceeds {} bytes",
            max
        )));
    }

    let reply = state
        .orchestrator
        .handle_message(&req.message, req.session_id.as_deref())
        .await;
    Ok(Json(reply.into()))
}

/// DELETE /chat/sessions/{id} - forget a session's context.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&session_id) {
        info!(session_id = %session_id, "Session reset");
        Ok(StatusCode::NO_CONTENT)
    } else {
        debug!(session_id = %session_id, "Session reset for unknown id");
        Err(ApiError::NotFound(format!("session {} not found", session_id)))
    }
}

// =============================================================================
// Health
// =============================================================================

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Sessions currently held in memory.
    pub sessions: u64,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.len() as u64,
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
