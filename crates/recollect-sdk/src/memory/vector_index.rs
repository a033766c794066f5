//! SQLite-backed vector index.
//!
//! Embeddings are stored as little-endian `f32` BLOBs in a database file of
//! their own, keyed by the exchange id from the record log. Queries embed the
//! text and do a linear cosine-distance scan over the rows written by the
//! current model. Fine for the few thousand exchanges a single user produces.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use recollect_core::memory::{Embedder, VectorIndex};
use recollect_core::types::{VectorFilter, VectorMatch, VectorMetadata};
use recollect_core::{Error, ExchangeId, Result};
use rusqlite::{params, Connection};

use super::embeddings::cosine_distance;
use super::migrations;
use super::record_log::busy_timeout_for;
use crate::utils::{content_hash, run_blocking, with_timeout};

/// [`VectorIndex`] over a dedicated SQLite file
#[derive(Clone)]
pub struct SqliteVectorIndex {
    conn: Arc<Mutex<Connection>>,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
    storage_timeout: Duration,
}

impl SqliteVectorIndex {
    /// Open (or create) the index at `path`
    pub fn open(
        path: &Path,
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
        storage_timeout: Duration,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(busy_timeout_for(storage_timeout))?;
        Self::from_connection(conn, embedder, embed_timeout, storage_timeout)
    }

    pub fn open_in_memory(
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
        storage_timeout: Duration,
    ) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, embedder, embed_timeout, storage_timeout)
    }

    fn from_connection(
        conn: Connection,
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
        storage_timeout: Duration,
    ) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            embedder,
            embed_timeout,
            storage_timeout,
        })
    }

    /// Embedding model used for writes and queries
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = with_timeout("embed", self.embed_timeout, self.embedder.embed(text)).await?;
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| Error::LockPoisoned)
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, id: ExchangeId, text: &str, metadata: &VectorMetadata) -> Result<()> {
        let vector = self.embed(text).await?;

        let conn = self.conn.clone();
        let session_id = metadata.session_id.clone();
        let model = self.embedder.model_name().to_string();
        let hash = content_hash(text);

        run_blocking("vector_index.upsert", self.storage_timeout, move || {
            let conn = lock(&conn)?;
            conn.execute(
                "INSERT INTO exchange_vectors (id, session_id, model, dimensions, content_hash, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    session_id = excluded.session_id,
                    model = excluded.model,
                    dimensions = excluded.dimensions,
                    content_hash = excluded.content_hash,
                    embedding = excluded.embedding,
                    created_at = excluded.created_at",
                params![
                    id.get(),
                    session_id,
                    model,
                    vector.len() as i64,
                    hash,
                    vector_to_blob(&vector),
                    Utc::now().timestamp_millis(),
                ],
            )
            .map_err(|e| Error::index_write(e.to_string()))?;
            tracing::debug!(id = %id, "Indexed exchange");
            Ok(())
        })
        .await
    }

    async fn query(&self, text: &str, k: usize, filter: &VectorFilter) -> Result<Vec<VectorMatch>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embed(text).await?;

        let conn = self.conn.clone();
        let model = self.embedder.model_name().to_string();
        let session_id = filter.session_id.clone();

        run_blocking("vector_index.query", self.storage_timeout, move || {
            let conn = lock(&conn)?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, embedding, content_hash FROM exchange_vectors
                     WHERE model = ?1 AND (?2 IS NULL OR session_id = ?2)",
                )
                .map_err(|e| Error::index_query(e.to_string()))?;

            let rows = stmt
                .query_map(params![model, session_id], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(|e| Error::index_query(e.to_string()))?;

            let mut matches = Vec::new();
            let mut skipped = 0usize;
            for row in rows {
                let (raw_id, blob, content_hash) = row.map_err(|e| Error::index_query(e.to_string()))?;
                let (Ok(id), Some(vector)) = (ExchangeId::new(raw_id), blob_to_vector(&blob)) else {
                    skipped += 1;
                    continue;
                };
                if vector.len() != query.len() {
                    skipped += 1;
                    continue;
                }
                matches.push(VectorMatch {
                    id,
                    distance: cosine_distance(&query, &vector),
                    content_hash,
                });
            }

            if skipped > 0 {
                tracing::warn!(skipped, "Skipped unreadable vectors during query");
            }

            matches.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            });
            matches.truncate(k);
            Ok(matches)
        })
        .await
    }

    async fn len(&self) -> Result<u64> {
        let conn = self.conn.clone();
        run_blocking("vector_index.len", self.storage_timeout, move || {
            let conn = lock(&conn)?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM exchange_vectors", [], |row| row.get(0))
                .map_err(|e| Error::index_query(e.to_string()))?;
            Ok(count.max(0) as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::embeddings::HashingEmbedder;
    use crate::testing::{FailingEmbedder, SlowEmbedder};

    const LIMIT: Duration = Duration::from_secs(5);

    fn index() -> SqliteVectorIndex {
        SqliteVectorIndex::open_in_memory(Arc::new(HashingEmbedder::new(128)), LIMIT, LIMIT).unwrap()
    }

    fn id(raw: i64) -> ExchangeId {
        ExchangeId::new(raw).unwrap()
    }

    fn meta(session: &str) -> VectorMetadata {
        VectorMetadata {
            session_id: session.into(),
        }
    }

    #[test]
    fn test_blob_encoding() {
        let vector = vec![0.5, -1.25, 3.0];
        let blob = vector_to_blob(&vector);
        assert_eq!(blob.len(), 12);
        assert_eq!(blob_to_vector(&blob), Some(vector));
        assert_eq!(blob_to_vector(&[0, 1, 2]), None);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = index();
        let matches = index.query("anything", 3, &VectorFilter::default()).await.unwrap();
        assert!(matches.is_empty());
        assert_eq!(index.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_k_returns_nothing() {
        let index = index();
        index.upsert(id(1), "a stone castle", &meta("s1")).await.unwrap();
        assert!(index.query("a stone castle", 0, &VectorFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_text_has_zero_distance() {
        let index = index();
        index.upsert(id(1), "a stone castle at dusk", &meta("s1")).await.unwrap();
        index.upsert(id(2), "neon city street", &meta("s1")).await.unwrap();

        let matches = index.query("a stone castle at dusk", 2, &VectorFilter::default()).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, id(1));
        assert!(matches[0].distance.abs() < 1e-5);
        assert!(matches[0].distance <= matches[1].distance);
        assert_eq!(matches[0].content_hash, content_hash("a stone castle at dusk"));
        assert_eq!(matches[1].content_hash, content_hash("neon city street"));
    }

    #[tokio::test]
    async fn test_results_are_bounded_and_sorted() {
        let index = index();
        let texts = ["red castle", "red castle tower", "blue ocean", "red dragon", "green forest"];
        for (i, text) in texts.iter().enumerate() {
            index.upsert(id(i as i64 + 1), text, &meta("s1")).await.unwrap();
        }

        let matches = index.query("red castle", 3, &VectorFilter::default()).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert!(matches.windows(2).all(|w| w[0].distance <= w[1].distance));

        let all = index.query("red castle", 50, &VectorFilter::default()).await.unwrap();
        assert_eq!(all.len(), texts.len());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_vector() {
        let index = index();
        index.upsert(id(1), "first text", &meta("s1")).await.unwrap();
        index.upsert(id(1), "completely different words", &meta("s1")).await.unwrap();

        assert_eq!(index.len().await.unwrap(), 1);
        let matches = index.query("completely different words", 1, &VectorFilter::default()).await.unwrap();
        assert!(matches[0].distance.abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_session_filter() {
        let index = index();
        index.upsert(id(1), "castle", &meta("s1")).await.unwrap();
        index.upsert(id(2), "castle", &meta("s2")).await.unwrap();

        let matches = index.query("castle", 5, &VectorFilter::session("s2")).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, id(2));
    }

    #[tokio::test]
    async fn test_vectors_from_other_models_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        let old = SqliteVectorIndex::open(&path, Arc::new(HashingEmbedder::new(64)), LIMIT, LIMIT).unwrap();
        old.upsert(id(1), "castle", &meta("s1")).await.unwrap();
        drop(old);

        let new = SqliteVectorIndex::open(&path, Arc::new(HashingEmbedder::new(32)), LIMIT, LIMIT).unwrap();
        assert_eq!(new.len().await.unwrap(), 1);
        assert!(new.query("castle", 3, &VectorFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_reported() {
        let index = SqliteVectorIndex::open_in_memory(Arc::new(FailingEmbedder), LIMIT, LIMIT).unwrap();
        let err = index.upsert(id(1), "castle", &meta("s1")).await.unwrap_err();
        assert!(err.is_index_failure());
        assert_eq!(index.len().await.unwrap(), 0);

        assert!(index.query("castle", 1, &VectorFilter::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_slow_embedder_times_out() {
        let embedder = Arc::new(SlowEmbedder {
            delay: Duration::from_secs(5),
        });
        let index = SqliteVectorIndex::open_in_memory(embedder, Duration::from_millis(20), LIMIT).unwrap();
        let err = index.upsert(id(1), "castle", &meta("s1")).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
