//! Shared application state.

use std::sync::Arc;

use lexrag_chat::AnswerGenerator;
use lexrag_core::LexRagConfig;
use lexrag_embed::EmbedderBackend;
use lexrag_ingest::IngestPipeline;
use lexrag_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: LexRagConfig,
    pub store: Arc<SqliteStore>,
    pub embedder: Arc<dyn EmbedderBackend>,
    pub pipeline: Arc<IngestPipeline>,
    pub generator: AnswerGenerator,
}

impl AppState {
    pub fn new(
        config: LexRagConfig,
        store: SqliteStore,
        embedder: Arc<dyn EmbedderBackend>,
        pipeline: IngestPipeline,
        generator: AnswerGenerator,
    ) -> Self {
        Self {
            config,
            store: Arc::new(store),
            embedder,
            pipeline: Arc::new(pipeline),
            generator,
        }
    }
}
