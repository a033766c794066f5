//! Memory Coordinator
//!
//! Joins the record log and the vector index on [`ExchangeId`].
//!
//! Writes are an ordered two-step: the record is appended first and only a
//! committed id is ever handed to the index. An index failure after that point
//! leaves a durable record that is reachable by id and session but not by
//! similarity. Reads go the other way: query the index, batch-fetch the ids,
//! and emit hits in index order, dropping ids the log no longer knows and
//! ids whose record text no longer matches the hash stored with the vector
//! (a log recreated under a surviving index reuses ids).

use std::sync::Arc;

use recollect_core::memory::{RecordLog, VectorIndex};
use recollect_core::types::{VectorFilter, VectorMetadata};
use recollect_core::{ExchangeId, ExchangeRecord, NewExchange, Result};
use tracing::{debug, error, info, warn};

use super::types::{MemoryStats, SaveOutcome, SimilarExchange, VectorWriteStatus};
use crate::utils::content_hash;

/// Coordinates saves and similarity lookups across both stores.
///
/// Holds no state of its own beyond the two store handles; cheap to clone.
#[derive(Clone)]
pub struct MemoryCoordinator {
    records: Arc<dyn RecordLog>,
    vectors: Arc<dyn VectorIndex>,
}

impl MemoryCoordinator {
    pub fn new(records: Arc<dyn RecordLog>, vectors: Arc<dyn VectorIndex>) -> Self {
        Self { records, vectors }
    }

    pub fn record_log(&self) -> &Arc<dyn RecordLog> {
        &self.records
    }

    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        &self.vectors
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Save an exchange and return its id.
    ///
    /// Only a record log failure is an error. A failed index write is logged
    /// and the save still succeeds.
    pub async fn save_exchange(
        &self,
        session_id: &str,
        user_prompt: &str,
        enhanced_prompt: Option<&str>,
    ) -> Result<ExchangeId> {
        let outcome = self
            .save_exchange_detailed(session_id, user_prompt, enhanced_prompt)
            .await?;
        Ok(outcome.id)
    }

    /// Save an exchange and report what happened to its vector.
    pub async fn save_exchange_detailed(
        &self,
        session_id: &str,
        user_prompt: &str,
        enhanced_prompt: Option<&str>,
    ) -> Result<SaveOutcome> {
        let exchange = NewExchange::new(session_id, user_prompt, enhanced_prompt.map(String::from));
        exchange.validate()?;

        let record = self.records.append(&exchange).await.map_err(|e| {
            error!(session_id, error = %e, "Failed to append exchange");
            e
        })?;

        let vector = match exchange.enhanced_text() {
            None => VectorWriteStatus::Skipped,
            Some(text) => {
                let metadata = VectorMetadata {
                    session_id: record.session_id.clone(),
                };
                match self.vectors.upsert(record.id, text, &metadata).await {
                    Ok(()) => VectorWriteStatus::Indexed,
                    Err(e) => {
                        warn!(
                            id = %record.id,
                            error = %e,
                            "Exchange saved but not indexed; it will not appear in similarity search"
                        );
                        VectorWriteStatus::Degraded(e.to_string())
                    }
                }
            }
        };

        info!(id = %record.id, session_id, vector = vector.as_str(), "Saved exchange");
        Ok(SaveOutcome { id: record.id, vector })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Up to `k` past exchanges closest to `query`, ascending distance.
    ///
    /// Index failures read as "no matches"; record log failures propagate.
    pub async fn find_similar(&self, query: &str, k: usize) -> Result<Vec<SimilarExchange>> {
        self.find_with_filter(query, k, &VectorFilter::default()).await
    }

    /// Same as [`find_similar`](Self::find_similar), restricted to one session.
    pub async fn find_similar_in_session(
        &self,
        query: &str,
        k: usize,
        session_id: &str,
    ) -> Result<Vec<SimilarExchange>> {
        self.find_with_filter(query, k, &VectorFilter::session(session_id)).await
    }

    async fn find_with_filter(
        &self,
        query: &str,
        k: usize,
        filter: &VectorFilter,
    ) -> Result<Vec<SimilarExchange>> {
        if k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let matches = match self.vectors.query(query, k, filter).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Vector index query failed; returning no matches");
                return Ok(Vec::new());
            }
        };
        if matches.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ExchangeId> = matches.iter().map(|m| m.id).collect();
        let mut records = self.records.fetch_by_ids(&ids).await?;

        let mut results = Vec::with_capacity(matches.len().min(k));
        for hit in matches.into_iter().take(k) {
            let Some(record) = records.remove(&hit.id) else {
                warn!(id = %hit.id, "Vector has no matching record; skipping");
                continue;
            };
            if record.enhanced_text().map(content_hash).as_deref() != Some(hit.content_hash.as_str()) {
                warn!(id = %hit.id, "Vector was computed from different text than its record; skipping");
                continue;
            }
            debug!(id = %hit.id, distance = hit.distance, "Similar exchange");
            results.push(SimilarExchange::from_record(record, hit.distance));
        }
        Ok(results)
    }

    /// Direct lookup by id
    pub async fn get_exchange(&self, id: ExchangeId) -> Result<Option<ExchangeRecord>> {
        self.records.get(id).await
    }

    /// Exchanges of one session, oldest first
    pub async fn session_history(&self, session_id: &str, limit: usize) -> Result<Vec<ExchangeRecord>> {
        self.records.list_session(session_id, limit).await
    }

    /// Record and vector counts
    pub async fn stats(&self) -> Result<MemoryStats> {
        let records = self.records.count().await?;
        let vectors = self.vectors.len().await?;
        Ok(MemoryStats {
            records,
            vectors,
            unindexed: records.saturating_sub(vectors),
        })
    }
}
