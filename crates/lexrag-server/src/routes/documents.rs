//! Document upload and listing routes.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::routes::{bad_request, error_response};
use crate::state::AppState;
use lexrag_core::Error;
use lexrag_store::content_hash;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents/upload", post(upload_document))
        .route("/documents", get(list_documents))
}

/// POST /api/documents/upload — ingest one file (multipart).
///
/// Fields: `file` (required), `metadata` (optional JSON object),
/// `client_id` (optional, defaults to "default").
async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut metadata_raw: Option<String> = None;
    let mut client_id = "default".to_string();

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(|n| n.to_string());
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                    Err(e) => return bad_request(&format!("Failed to read file: {}", e)),
                }
            }
            Some("metadata") => match field.text().await {
                Ok(text) => metadata_raw = Some(text),
                Err(e) => return bad_request(&format!("Failed to read metadata: {}", e)),
            },
            Some("client_id") => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        client_id = text.trim().to_string();
                    }
                }
            }
            _ => {}
        }
    }

    let file_bytes = match file_bytes {
        Some(bytes) => bytes,
        None => return bad_request("Missing file field"),
    };
    let filename = match filename {
        Some(name) if !name.trim().is_empty() => name,
        _ => return bad_request("Uploaded file has no filename"),
    };

    // Malformed metadata rejects the request before any indexing.
    let base_metadata: BTreeMap<String, serde_json::Value> = match metadata_raw {
        Some(raw) if !raw.trim().is_empty() => match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(_) => return bad_request("Metadata must be a JSON object"),
        },
        _ => BTreeMap::new(),
    };

    let file_hash = content_hash(&file_bytes);
    match state.store.find_document_by_hash(&file_hash, &client_id) {
        Ok(Some(_)) => return error_response(Error::DuplicateContent(file_hash)),
        Ok(None) => {}
        Err(e) => return error_response(e),
    }

    // Extraction, chunking, embedding, and indexing are all blocking.
    let store = state.store.clone();
    let embedder = state.embedder.clone();
    let pipeline = state.pipeline.clone();
    let filename_owned = filename.clone();
    let client_id_owned = client_id.clone();

    let result = tokio::task::spawn_blocking(move || -> lexrag_core::Result<(Option<i64>, usize)> {
        let chunks = pipeline.ingest(
            &file_bytes,
            &filename_owned,
            &base_metadata,
            &client_id_owned,
        )?;

        if chunks.is_empty() {
            return Ok((None, 0));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts);

        let doc_id = store.index_chunks(
            &filename_owned,
            &client_id_owned,
            Some(&file_hash),
            &chunks,
            &embeddings,
        )?;
        Ok((Some(doc_id), chunks.len()))
    })
    .await;

    let (doc_id, chunk_count) = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return error_response(e),
        Err(e) => return error_response(Error::Internal(e.to_string())),
    };

    info!(
        "Uploaded {} for client {}: {} chunks indexed",
        filename, client_id, chunk_count
    );

    Json(serde_json::json!({
        "message": format!("Indexed {}", filename),
        "documentId": doc_id,
        "chunksIndexed": chunk_count,
    }))
    .into_response()
}

/// GET /api/documents?client_id=... — list a tenant's documents.
async fn list_documents(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<BTreeMap<String, String>>,
) -> Response {
    let client_id = params
        .get("client_id")
        .map(|s| s.as_str())
        .unwrap_or("default");

    match state.store.documents_for_client(client_id) {
        Ok(documents) => {
            let total = documents.len();
            Json(serde_json::json!({
                "documents": documents,
                "total": total,
            }))
            .into_response()
        }
        Err(e) => error_response(e),
    }
}
