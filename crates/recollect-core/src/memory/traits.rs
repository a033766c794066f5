//! Store traits defining the two halves of the episodic memory.
//!
//! Implementations handle the actual storage backend (SQLite, in-memory, etc.).
//! Adapters own their I/O bounds and any retry policy; callers only see
//! success or a typed failure.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ExchangeId, ExchangeRecord, NewExchange, VectorFilter, VectorMatch, VectorMetadata};

/// Maps text to a fixed-dimension vector.
///
/// Deterministic for a given model. Failure is an error, never a zero vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier stored next to each vector.
    fn model_name(&self) -> &str;

    /// Output dimension, stable for the lifetime of the embedder.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Durable, append-only log of exchange records.
#[async_trait]
pub trait RecordLog: Send + Sync {
    /// Persist a new record and return it with its assigned id and timestamp.
    ///
    /// Fails with `StorageWrite` when the backend is unreachable or rejects the row.
    async fn append(&self, exchange: &NewExchange) -> Result<ExchangeRecord>;

    /// Batch lookup. Unknown ids are omitted; ordering is the caller's concern.
    async fn fetch_by_ids(&self, ids: &[ExchangeId]) -> Result<HashMap<ExchangeId, ExchangeRecord>>;

    /// Direct lookup by id.
    async fn get(&self, id: ExchangeId) -> Result<Option<ExchangeRecord>>;

    /// Records of one session, oldest first.
    async fn list_session(&self, session_id: &str, limit: usize) -> Result<Vec<ExchangeRecord>>;

    /// Number of records.
    async fn count(&self) -> Result<u64>;
}

/// Nearest-neighbor index over embeddings of enhanced prompts.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embed `text` and store it under `id`.
    ///
    /// `id` must already be committed in the record log. Fails with
    /// `IndexWrite` (or `Embedding`/`Timeout`) when the embedder or backend is
    /// unavailable.
    async fn upsert(&self, id: ExchangeId, text: &str, metadata: &VectorMetadata) -> Result<()>;

    /// Top-`k` matches for `text`, ascending cosine distance.
    ///
    /// An empty index or `k == 0` yields an empty vec, not an error.
    async fn query(&self, text: &str, k: usize, filter: &VectorFilter) -> Result<Vec<VectorMatch>>;

    /// Number of stored vectors.
    async fn len(&self) -> Result<u64>;
}
