//! LexRAG — document question-answering server for legal teams.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("LEXRAG_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = lexrag_core::LexRagConfig::from_env(&data_dir)?;
    let port = config.port;

    let store =
        lexrag_store::SqliteStore::open(&config.data_paths.index, config.embedding_dim)
            .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let embedder = lexrag_embed::create_embedder(config.embedding_dim);

    let pipeline =
        lexrag_ingest::IngestPipeline::new(config.max_chunk_size, config.chunk_overlap)
            .map_err(|e| anyhow::anyhow!("Invalid chunking config: {}", e))?;

    let llm_config = lexrag_chat::LlmConfig::from_env();
    if !llm_config.is_configured() {
        warn!("No LLM API key configured; /api/ask will return apologies only");
    }
    let generator = lexrag_chat::AnswerGenerator::new(llm_config);

    let state = Arc::new(AppState::new(config, store, embedder, pipeline, generator));

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("LexRAG server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
