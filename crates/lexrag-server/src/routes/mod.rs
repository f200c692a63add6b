//! HTTP route handlers.

pub mod ask;
pub mod documents;
pub mod sessions;
pub mod status;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use lexrag_core::Error;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(ask::routes())
        .merge(documents::routes())
        .merge(sessions::routes())
        .merge(status::routes())
}

/// Map a domain error onto an HTTP response. Internal details are
/// logged, not leaked: 500s carry a generic message.
pub fn error_response(err: Error) -> Response {
    let (status, message) = match &err {
        Error::Extraction(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        Error::Chunking(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        Error::DuplicateContent(_) => (
            StatusCode::CONFLICT,
            "This document has already been uploaded".to_string(),
        ),
        _ => {
            tracing::error!("Request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// 400 with an error body.
pub fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
