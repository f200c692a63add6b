//! SQLite-backed chunk index with FTS5 BM25 + quantized vector search.
//!
//! This is the retrieval gateway: every search leg filters on the
//! caller's `client_id` inside the query, so one tenant's chunks can
//! never surface in another tenant's results.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::embedding::QuantizedEmbedding;
use crate::schema::{FTS_SCHEMA_SQL, FTS_TRIGGERS_SQL, SCHEMA_SQL};
use crate::types::*;
use lexrag_core::{Error, Result};
use lexrag_ingest::TaggedChunk;

/// Rank constant for reciprocal rank fusion.
const RRF_K: usize = 60;

/// SQLite store holding the chunk index and conversation history.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
    db_path: PathBuf,
    embedding_dim: usize,
    /// Pre-loaded normalized embedding matrix with per-row tenant ids.
    embedding_matrix: Mutex<EmbeddingMatrix>,
}

struct EmbeddingMatrix {
    /// Normalized embeddings, shape (N, dim).
    matrix: Array2<f32>,
    /// Chunk IDs corresponding to each row.
    chunk_ids: Vec<i64>,
    /// Tenant owning each row, for query-time filtering.
    client_ids: Vec<String>,
    dirty: bool,
}

/// SHA-256 of the raw upload, for duplicate detection.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl SqliteStore {
    /// Open or create the store. `db_dir` is the directory; the file is
    /// `db_dir/lexrag.db`.
    pub fn open(db_dir: impl AsRef<Path>, embedding_dim: usize) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Store(e.to_string()))?;
        let db_path = db_dir.join("lexrag.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
            embedding_dim,
            embedding_matrix: Mutex::new(EmbeddingMatrix {
                matrix: Array2::zeros((0, embedding_dim)),
                chunk_ids: Vec::new(),
                client_ids: Vec::new(),
                dirty: true,
            }),
        };

        store.load_embedding_matrix()?;

        let stats = store.get_stats()?;
        info!(
            "SqliteStore initialized: {} documents, {} chunks, {} sessions, dim={}, path={}",
            stats.total_documents,
            stats.total_chunks,
            stats.total_sessions,
            embedding_dim,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Store(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Store(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        let full_schema = format!("{}\n{}\n{}", SCHEMA_SQL, FTS_SCHEMA_SQL, FTS_TRIGGERS_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Store(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Indexing
    // ---------------------------------------------------------------

    /// Index one file's tagged chunks in a single transaction.
    ///
    /// All-or-nothing: any failure rolls back the document row, every
    /// chunk, and every embedding. `embeddings` must be empty (BM25-only
    /// mode) or aligned one-to-one with `chunks`. Returns the document ID.
    pub fn index_chunks(
        &self,
        filename: &str,
        client_id: &str,
        file_hash: Option<&str>,
        chunks: &[TaggedChunk],
        embeddings: &[Option<Array1<f32>>],
    ) -> Result<i64> {
        if !embeddings.is_empty() && embeddings.len() != chunks.len() {
            return Err(Error::Internal(format!(
                "embedding count {} does not match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let now = now_millis();
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Index(e.to_string()))?;

        let doc_id = tx
            .prepare_cached(
                "INSERT INTO documents (filename, client_id, content_hash, chunk_count, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(|e| Error::Index(e.to_string()))?
            .insert(params![filename, client_id, file_hash, chunks.len() as i64, now])
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    Error::DuplicateContent(file_hash.unwrap_or_default().to_string())
                } else {
                    Error::Index(e.to_string())
                }
            })?;

        for (i, chunk) in chunks.iter().enumerate() {
            let meta_json = serde_json::to_string(&chunk.metadata)?;
            let chunk_id = tx
                .prepare_cached(
                    "INSERT INTO chunks (doc_id, client_id, content, chunk_index, \
                     original_filename, ingestion_timestamp, metadata_json, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|e| Error::Index(e.to_string()))?
                .insert(params![
                    doc_id,
                    chunk.metadata.client_id,
                    chunk.content,
                    i as i64,
                    chunk.metadata.original_filename,
                    chunk.metadata.ingestion_timestamp,
                    meta_json,
                    now,
                ])
                .map_err(|e| Error::Index(e.to_string()))?;

            if let Some(Some(embedding)) = embeddings.get(i) {
                let quantized = QuantizedEmbedding::from_vector(embedding);
                tx.execute(
                    "INSERT INTO chunk_embeddings (chunk_id, embedding, scale, offset_val) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![chunk_id, quantized.bytes, quantized.scale, quantized.offset],
                )
                .map_err(|e| Error::Index(e.to_string()))?;
            }
        }

        tx.commit().map_err(|e| Error::Index(e.to_string()))?;
        drop(conn);

        self.embedding_matrix.lock().dirty = true;
        info!(
            "Indexed {} chunks of {} for client {} as document {}",
            chunks.len(),
            filename,
            client_id,
            doc_id
        );
        Ok(doc_id)
    }

    /// Find one tenant's indexed document by its upload content hash.
    /// Duplicate detection is per tenant; another tenant holding the
    /// same bytes is not observable through this lookup.
    pub fn find_document_by_hash(
        &self,
        file_hash: &str,
        client_id: &str,
    ) -> Result<Option<DocumentRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE content_hash = ?1 AND client_id = ?2")
            .map_err(|e| Error::Index(e.to_string()))?
            .query_row(params![file_hash, client_id], |row| {
                Ok(Self::row_to_document(row))
            })
            .optional()
            .map_err(|e| Error::Index(e.to_string()))?;
        Ok(row)
    }

    /// Get an indexed document by ID.
    pub fn get_document(&self, doc_id: i64) -> Result<Option<DocumentRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE id = ?1")
            .map_err(|e| Error::Index(e.to_string()))?
            .query_row(params![doc_id], |row| Ok(Self::row_to_document(row)))
            .optional()
            .map_err(|e| Error::Index(e.to_string()))?;
        Ok(row)
    }

    /// Delete a document and its chunks (cascade).
    pub fn delete_document(&self, doc_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![doc_id])
            .map_err(|e| Error::Index(e.to_string()))?;
        if count > 0 {
            drop(conn);
            self.embedding_matrix.lock().dirty = true;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// List documents belonging to one tenant, newest first.
    pub fn documents_for_client(&self, client_id: &str) -> Result<Vec<DocumentRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM documents WHERE client_id = ?1 ORDER BY created_at DESC",
            )
            .map_err(|e| Error::Index(e.to_string()))?;
        let rows = stmt
            .query_map(params![client_id], |row| Ok(Self::row_to_document(row)))
            .map_err(|e| Error::Index(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------

    /// Top-k retrieval scoped to one tenant, ordered by descending
    /// relevance. Hybrid BM25 + vector with RRF fusion when a query
    /// embedding is supplied; BM25-only otherwise. Returns an empty
    /// sequence, not an error, when nothing matches.
    pub fn search(
        &self,
        query: &str,
        client_id: &str,
        k: usize,
        query_embedding: Option<&Array1<f32>>,
    ) -> Result<Vec<RetrievedChunk>> {
        let bm25_hits = self.bm25_search(query, client_id, k)?;

        let mut fused = match query_embedding {
            Some(embedding) => {
                let vector_hits = self.vector_search(embedding, client_id, k)?;
                Self::reciprocal_rank_fusion(&bm25_hits, &vector_hits, RRF_K)
            }
            None => bm25_hits,
        };

        fused.truncate(k);
        debug!(
            "Search for client {} returned {} chunks (k={})",
            client_id,
            fused.len(),
            k
        );
        Ok(fused)
    }

    /// Full-text search using FTS5 BM25 ranking, tenant-filtered in SQL.
    pub fn bm25_search(
        &self,
        query: &str,
        client_id: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let fts_query = Self::sanitize_fts_query(query);
        if fts_query.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock();
        let sql = "SELECT c.*, chunks_fts.rank AS bm25_score \
                   FROM chunks_fts \
                   JOIN chunks c ON c.id = chunks_fts.rowid \
                   WHERE chunks_fts MATCH ?1 \
                     AND c.client_id = ?2 \
                   ORDER BY chunks_fts.rank \
                   LIMIT ?3";

        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| Error::Index(e.to_string()))?;
        let rows = stmt
            .query_map(params![fts_query, client_id, top_k as i64], |row| {
                let bm25_score: f64 = row.get("bm25_score").unwrap_or(0.0);
                // FTS5 rank is negative; negate so higher is better.
                Ok(Self::row_to_retrieved(row, -bm25_score))
            })
            .map_err(|e| Error::Index(e.to_string()))?;

        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Sanitize a user query for FTS5 MATCH syntax: quote each token,
    /// join with OR.
    fn sanitize_fts_query(query: &str) -> String {
        let tokens: Vec<String> = query
            .split_whitespace()
            .filter(|t| !t.is_empty())
            .map(|t| format!("\"{}\"", t.replace('"', "")))
            .collect();
        tokens.join(" OR ")
    }

    // ---------------------------------------------------------------
    // Vector search
    // ---------------------------------------------------------------

    fn load_embedding_matrix(&self) -> Result<()> {
        let mut chunk_ids = Vec::new();
        let mut client_ids = Vec::new();
        let mut embeddings: Vec<Array1<f32>> = Vec::new();

        {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare(
                    "SELECT ce.chunk_id, ce.embedding, ce.scale, ce.offset_val, c.client_id \
                     FROM chunk_embeddings ce \
                     JOIN chunks c ON c.id = ce.chunk_id",
                )
                .map_err(|e| Error::Index(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    let chunk_id: i64 = row.get(0)?;
                    let blob: Vec<u8> = row.get(1)?;
                    let scale: f64 = row.get(2)?;
                    let offset: f64 = row.get(3)?;
                    let client_id: String = row.get(4)?;
                    Ok((chunk_id, blob, scale as f32, offset as f32, client_id))
                })
                .map_err(|e| Error::Index(e.to_string()))?;

            for row in rows {
                let (cid, blob, scale, offset, client) =
                    row.map_err(|e| Error::Index(e.to_string()))?;
                chunk_ids.push(cid);
                client_ids.push(client);
                embeddings.push(QuantizedEmbedding::restore(&blob, scale, offset));
            }
        }

        let mut mat = self.embedding_matrix.lock();
        if embeddings.is_empty() {
            mat.matrix = Array2::zeros((0, self.embedding_dim));
            mat.chunk_ids = Vec::new();
            mat.client_ids = Vec::new();
            mat.dirty = false;
            return Ok(());
        }

        let n = embeddings.len();
        let mut matrix = Array2::zeros((n, self.embedding_dim));
        for (i, emb) in embeddings.iter().enumerate() {
            matrix.row_mut(i).assign(emb);
        }

        // Normalize rows so cosine similarity reduces to a dot product.
        for mut row in matrix.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 1e-9 {
                row /= norm;
            }
        }

        mat.matrix = matrix;
        mat.chunk_ids = chunk_ids;
        mat.client_ids = client_ids;
        mat.dirty = false;
        debug!("Loaded {} embeddings into matrix", n);
        Ok(())
    }

    fn ensure_matrix_loaded(&self) -> Result<()> {
        if self.embedding_matrix.lock().dirty {
            self.load_embedding_matrix()?;
        }
        Ok(())
    }

    /// Cosine similarity over the pre-loaded matrix. Rows belonging to
    /// other tenants are masked out before ranking, never after.
    pub fn vector_search(
        &self,
        query_embedding: &Array1<f32>,
        client_id: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        self.ensure_matrix_loaded()?;

        let mat = self.embedding_matrix.lock();
        if mat.matrix.nrows() == 0 {
            return Ok(Vec::new());
        }

        let q_norm = query_embedding.dot(query_embedding).sqrt();
        if q_norm < 1e-9 {
            return Ok(Vec::new());
        }
        let q = query_embedding / q_norm;

        let similarities = mat.matrix.dot(&q);

        let mut scored: Vec<(i64, f64)> = similarities
            .iter()
            .enumerate()
            .filter(|&(i, _)| mat.client_ids[i] == client_id)
            .map(|(i, &s)| (mat.chunk_ids[i], s as f64))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        drop(mat);

        let mut results = Vec::with_capacity(scored.len());
        for (chunk_id, score) in scored {
            if let Some(chunk) = self.get_retrieved_chunk(chunk_id, score)? {
                results.push(chunk);
            }
        }
        Ok(results)
    }

    fn get_retrieved_chunk(&self, chunk_id: i64, score: f64) -> Result<Option<RetrievedChunk>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM chunks WHERE id = ?1")
            .map_err(|e| Error::Index(e.to_string()))?
            .query_row(params![chunk_id], |row| Ok(Self::row_to_retrieved(row, score)))
            .optional()
            .map_err(|e| Error::Index(e.to_string()))?;
        Ok(row)
    }

    /// Fuse two ranked lists with reciprocal rank fusion:
    /// score = sum(1 / (k + rank + 1)) across lists.
    fn reciprocal_rank_fusion(
        bm25_results: &[RetrievedChunk],
        vector_results: &[RetrievedChunk],
        k: usize,
    ) -> Vec<RetrievedChunk> {
        let mut rrf_scores: HashMap<i64, f64> = HashMap::new();
        let mut chunk_map: HashMap<i64, &RetrievedChunk> = HashMap::new();

        for (rank, hit) in bm25_results.iter().enumerate() {
            *rrf_scores.entry(hit.chunk_id).or_insert(0.0) +=
                1.0 / (k as f64 + rank as f64 + 1.0);
            chunk_map.entry(hit.chunk_id).or_insert(hit);
        }
        for (rank, hit) in vector_results.iter().enumerate() {
            *rrf_scores.entry(hit.chunk_id).or_insert(0.0) +=
                1.0 / (k as f64 + rank as f64 + 1.0);
            chunk_map.entry(hit.chunk_id).or_insert(hit);
        }

        let mut sorted: Vec<(i64, f64)> = rrf_scores.into_iter().collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        sorted
            .into_iter()
            .filter_map(|(cid, score)| {
                chunk_map.get(&cid).map(|hit| {
                    let mut fused = (*hit).clone();
                    fused.score = score;
                    fused
                })
            })
            .collect()
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Get store statistics.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let doc_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| Error::Index(e.to_string()))?;
        let chunk_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| Error::Index(e.to_string()))?;
        let emb_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunk_embeddings", [], |row| row.get(0))
            .map_err(|e| Error::Index(e.to_string()))?;
        let session_count: i64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT session_id) FROM messages",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        drop(conn);

        let db_size = std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0);

        Ok(StoreStats {
            total_documents: doc_count,
            total_chunks: chunk_count,
            embeddings_stored: emb_count,
            total_sessions: session_count,
            embedding_dimension: self.embedding_dim,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    // ---------------------------------------------------------------
    // Row mapping helpers
    // ---------------------------------------------------------------

    fn row_to_document(row: &rusqlite::Row<'_>) -> DocumentRecord {
        DocumentRecord {
            id: row.get("id").unwrap_or(0),
            filename: row.get("filename").unwrap_or_default(),
            client_id: row.get("client_id").unwrap_or_default(),
            content_hash: row.get("content_hash").ok().flatten(),
            chunk_count: row.get("chunk_count").unwrap_or(0),
            created_at: row.get("created_at").unwrap_or(0),
        }
    }

    fn row_to_retrieved(row: &rusqlite::Row<'_>, score: f64) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: row.get("id").unwrap_or(0),
            doc_id: row.get("doc_id").unwrap_or(0),
            content: row.get("content").unwrap_or_default(),
            client_id: row.get("client_id").unwrap_or_default(),
            original_filename: row.get("original_filename").unwrap_or_default(),
            metadata: row
                .get::<_, Option<String>>("metadata_json")
                .ok()
                .flatten()
                .and_then(|s| serde_json::from_str(&s).ok()),
            score,
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrag_ingest::{ChunkMetadata, TaggedChunk};
    use tempfile::TempDir;

    fn test_store(dim: usize) -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path(), dim).unwrap();
        (store, dir)
    }

    fn chunk(content: &str, client_id: &str, filename: &str) -> TaggedChunk {
        TaggedChunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                original_filename: filename.to_string(),
                ingestion_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
                client_id: client_id.to_string(),
                extra: Default::default(),
            },
        }
    }

    fn index_texts(store: &SqliteStore, client_id: &str, filename: &str, texts: &[&str]) -> i64 {
        let chunks: Vec<TaggedChunk> = texts
            .iter()
            .map(|t| chunk(t, client_id, filename))
            .collect();
        store
            .index_chunks(filename, client_id, None, &chunks, &[])
            .unwrap()
    }

    #[test]
    fn test_index_and_get_document() {
        let (store, _dir) = test_store(8);
        let doc_id = index_texts(
            &store,
            "tenant-x",
            "contract.txt",
            &["The contract clause binds both parties.", "Termination requires notice."],
        );

        let doc = store.get_document(doc_id).unwrap().unwrap();
        assert_eq!(doc.filename, "contract.txt");
        assert_eq!(doc.client_id, "tenant-x");
        assert_eq!(doc.chunk_count, 2);
    }

    #[test]
    fn test_duplicate_upload_rejected_within_tenant() {
        let (store, _dir) = test_store(8);
        let chunks = vec![chunk("Same content.", "tenant-x", "a.txt")];
        store
            .index_chunks("a.txt", "tenant-x", Some("hash1"), &chunks, &[])
            .unwrap();
        let result = store.index_chunks("a.txt", "tenant-x", Some("hash1"), &chunks, &[]);
        assert!(matches!(result, Err(Error::DuplicateContent(_))));
    }

    #[test]
    fn test_same_content_indexes_independently_per_tenant() {
        let (store, _dir) = test_store(8);
        let x_chunks = vec![chunk("Shared template text.", "tenant-x", "form.txt")];
        let y_chunks = vec![chunk("Shared template text.", "tenant-y", "form.txt")];

        store
            .index_chunks("form.txt", "tenant-x", Some("samehash"), &x_chunks, &[])
            .unwrap();
        // Another tenant uploading identical bytes is not a duplicate.
        store
            .index_chunks("form.txt", "tenant-y", Some("samehash"), &y_chunks, &[])
            .unwrap();

        assert!(store
            .find_document_by_hash("samehash", "tenant-x")
            .unwrap()
            .is_some());
        assert!(store
            .find_document_by_hash("samehash", "tenant-y")
            .unwrap()
            .is_some());
        // The lookup itself is tenant-scoped.
        assert!(store
            .find_document_by_hash("samehash", "tenant-z")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_tenant_isolation_bm25() {
        let (store, _dir) = test_store(8);

        let x_texts: Vec<String> = (0..5)
            .map(|i| format!("Contract clause number {} for tenant x.", i))
            .collect();
        let y_texts: Vec<String> = (0..5)
            .map(|i| format!("Contract clause number {} for tenant y.", i))
            .collect();
        index_texts(
            &store,
            "tenant-x",
            "x.txt",
            &x_texts.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        );
        index_texts(
            &store,
            "tenant-y",
            "y.txt",
            &y_texts.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        );

        let results = store.search("contract clause", "tenant-x", 3, None).unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        for hit in &results {
            assert_eq!(hit.client_id, "tenant-x");
        }
    }

    #[test]
    fn test_tenant_isolation_vector_leg() {
        let (store, _dir) = test_store(4);

        let mut emb_x = Array1::zeros(4);
        emb_x[0] = 1.0;
        let mut emb_y = Array1::zeros(4);
        emb_y[1] = 1.0;

        store
            .index_chunks(
                "x.txt",
                "tenant-x",
                None,
                &[chunk("Tenant x text.", "tenant-x", "x.txt")],
                &[Some(emb_x)],
            )
            .unwrap();
        store
            .index_chunks(
                "y.txt",
                "tenant-y",
                None,
                &[chunk("Tenant y text.", "tenant-y", "y.txt")],
                &[Some(emb_y.clone())],
            )
            .unwrap();

        // Query identical to tenant-y's embedding, scoped to tenant-x:
        // the y chunk must never appear.
        let results = store.vector_search(&emb_y, "tenant-x", 5).unwrap();
        for hit in &results {
            assert_eq!(hit.client_id, "tenant-x");
        }
    }

    #[test]
    fn test_hybrid_search_ranks_similar_first() {
        let (store, _dir) = test_store(4);

        let mut emb_a = Array1::zeros(4);
        emb_a[0] = 1.0;
        let mut emb_b = Array1::zeros(4);
        emb_b[2] = 1.0;

        store
            .index_chunks(
                "law.txt",
                "tenant-x",
                None,
                &[
                    chunk("The lease agreement covers rent.", "tenant-x", "law.txt"),
                    chunk("Unrelated criminal procedure text.", "tenant-x", "law.txt"),
                ],
                &[Some(emb_a.clone()), Some(emb_b)],
            )
            .unwrap();

        let results = store
            .search("lease agreement rent", "tenant-x", 2, Some(&emb_a))
            .unwrap();
        assert!(!results.is_empty());
        assert!(results[0].content.contains("lease"));
    }

    #[test]
    fn test_no_match_returns_empty_not_error() {
        let (store, _dir) = test_store(8);
        let results = store.search("anything", "tenant-x", 5, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_delete_document_cascades() {
        let (store, _dir) = test_store(8);
        let doc_id = index_texts(&store, "tenant-x", "gone.txt", &["Disappearing clause."]);

        assert!(store.delete_document(doc_id).unwrap());
        assert!(store.get_document(doc_id).unwrap().is_none());
        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_chunks, 0);
    }

    #[test]
    fn test_stats() {
        let (store, _dir) = test_store(8);
        index_texts(&store, "tenant-x", "s.txt", &["One chunk.", "Two chunks."]);

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.embedding_dimension, 8);
    }
}
