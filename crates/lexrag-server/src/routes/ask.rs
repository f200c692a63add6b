//! Question answering route.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use tracing::debug;

use crate::routes::{bad_request, error_response};
use crate::state::AppState;
use lexrag_chat::{ChatMessage, ContextChunk};
use lexrag_core::Error;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ask", post(ask))
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
    #[serde(default = "default_client_id", rename = "clientId")]
    client_id: String,
}

fn default_client_id() -> String {
    "default".to_string()
}

/// POST /api/ask — answer a question grounded in the tenant's documents.
async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return bad_request("Question must not be empty");
    }

    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // History is everything before this question.
    let history = match state.store.load_conversation(&session_id) {
        Ok(messages) => messages,
        Err(e) => return error_response(e),
    };

    if let Err(e) = state.store.append_message(&session_id, "user", &question) {
        return error_response(e);
    }

    // Retrieval is blocking work (SQLite + optional embedding HTTP call).
    let store = state.store.clone();
    let embedder = state.embedder.clone();
    let client_id = req.client_id.clone();
    let query = question.clone();
    let top_k = state.config.top_k;

    let retrieved = tokio::task::spawn_blocking(move || {
        let query_embedding = embedder.embed(&query);
        store.search(&query, &client_id, top_k, query_embedding.as_ref())
    })
    .await;

    let chunks = match retrieved {
        Ok(Ok(hits)) => hits,
        Ok(Err(e)) => return error_response(e),
        Err(e) => return error_response(Error::Internal(e.to_string())),
    };

    debug!(
        "Retrieved {} chunks for session {} (client {})",
        chunks.len(),
        session_id,
        req.client_id
    );

    let context: Vec<ContextChunk> = chunks
        .iter()
        .map(|hit| ContextChunk {
            content: hit.content.clone(),
            original_filename: Some(hit.original_filename.clone()),
        })
        .collect();

    let chat_history: Vec<ChatMessage> = history
        .iter()
        .map(|m| ChatMessage::new(m.role.clone(), m.content.clone()))
        .collect();

    let (answer, sources) = match state.generator.generate(&question, &context, &chat_history).await
    {
        Ok(result) => result,
        Err(e) => return error_response(e),
    };

    if let Err(e) = state.store.append_message(&session_id, "ai", &answer) {
        return error_response(e);
    }

    Json(serde_json::json!({
        "sessionId": session_id,
        "answer": answer,
        "sources": sources,
    }))
    .into_response()
}
