//! Service status route.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;

use crate::routes::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status — health and store statistics.
async fn get_status(State(state): State<Arc<AppState>>) -> Response {
    let stats = match state.store.get_stats() {
        Ok(stats) => stats,
        Err(e) => return error_response(e),
    };

    Json(serde_json::json!({
        "status": "ok",
        "llmAvailable": state.generator.is_available(),
        "llmProvider": state.generator.active_provider(),
        "embeddingsAvailable": state.embedder.is_available(),
        "documents": stats.total_documents,
        "chunks": stats.total_chunks,
        "embeddings": stats.embeddings_stored,
        "sessions": stats.total_sessions,
        "embeddingDimension": stats.embedding_dimension,
        "dbSizeMb": stats.db_size_mb,
    }))
    .into_response()
}
