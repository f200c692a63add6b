//! Session listing, history, and deletion routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get};
use axum::Router;

use crate::routes::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/{session_id}/history", get(session_history))
        .route("/sessions/{session_id}", delete(delete_session))
}

/// GET /api/sessions — all sessions with display titles.
async fn list_sessions(State(state): State<Arc<AppState>>) -> Response {
    match state.store.session_summaries() {
        Ok(sessions) => Json(serde_json::json!({ "sessions": sessions })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sessions/{id}/history — ordered message history.
/// Unknown sessions return an empty history.
async fn session_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    match state.store.load_conversation(&session_id) {
        Ok(messages) => Json(serde_json::json!({
            "sessionId": session_id,
            "history": messages,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/sessions/{id} — remove a session's messages.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    match state.store.delete_conversation(&session_id) {
        Ok(removed) => Json(serde_json::json!({
            "sessionId": session_id,
            "deleted": removed,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}
