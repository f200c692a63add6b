//! Remote embedder backed by an OpenAI-compatible embeddings endpoint.

use std::time::Duration;

use ndarray::Array1;
use serde::Deserialize;
use tracing::warn;

use crate::embedder::EmbedderBackend;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Embedder that calls a hosted embeddings API. A failed call returns
/// None so retrieval can continue on the BM25 leg alone.
pub struct RemoteEmbedder {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
    dim: usize,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    /// Build from environment. Returns None when no API key is set.
    ///
    /// Env vars: EMBEDDING_API_KEY (falls back to OPENAI_API_KEY),
    /// EMBEDDING_BASE_URL, EMBEDDING_MODEL.
    pub fn from_env(dim: usize) -> Option<Self> {
        let api_key = std::env::var("EMBEDDING_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()?;
        if api_key.trim().is_empty() {
            return None;
        }

        let base_url = std::env::var("EMBEDDING_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .ok()?;

        Some(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dim,
        })
    }

    fn request(&self, inputs: &[&str]) -> Option<Vec<Array1<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| warn!("Embeddings request failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            warn!("Embeddings API returned status {}", response.status());
            return None;
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .map_err(|e| warn!("Embeddings response parse failed: {}", e))
            .ok()?;

        if parsed.data.len() != inputs.len() {
            warn!(
                "Embeddings API returned {} vectors for {} inputs",
                parsed.data.len(),
                inputs.len()
            );
            return None;
        }

        Some(
            parsed
                .data
                .into_iter()
                .map(|e| Array1::from_vec(e.embedding))
                .collect(),
        )
    }
}

impl EmbedderBackend for RemoteEmbedder {
    fn embed(&self, text: &str) -> Option<Array1<f32>> {
        self.request(&[text])?.into_iter().next()
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Array1<f32>>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.request(texts) {
            Some(vectors) => vectors.into_iter().map(Some).collect(),
            None => vec![None; texts.len()],
        }
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        true
    }
}
