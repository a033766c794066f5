//! Failing and slow doubles for exercising degraded paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use recollect_core::memory::{Embedder, RecordLog, VectorIndex};
use recollect_core::types::{VectorFilter, VectorMatch, VectorMetadata};
use recollect_core::{Error, ExchangeId, ExchangeRecord, NewExchange, Result};

use crate::memory::SimilarExchange;
use crate::workflow::{ChatTurn, PromptEnhancer};

/// Embedder whose backend is always down
pub(crate) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimensions(&self) -> usize {
        8
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("embedding service unavailable"))
    }
}

/// Embedder that answers after `delay`
pub(crate) struct SlowEmbedder {
    pub delay: Duration,
}

#[async_trait]
impl Embedder for SlowEmbedder {
    fn model_name(&self) -> &str {
        "slow"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![1.0, 0.0])
    }
}

/// Vector index that rejects every call
pub(crate) struct UnavailableVectorIndex;

#[async_trait]
impl VectorIndex for UnavailableVectorIndex {
    async fn upsert(&self, _id: ExchangeId, _text: &str, _metadata: &VectorMetadata) -> Result<()> {
        Err(Error::index_write("vector store unreachable"))
    }

    async fn query(&self, _text: &str, _k: usize, _filter: &VectorFilter) -> Result<Vec<VectorMatch>> {
        Err(Error::index_query("vector store unreachable"))
    }

    async fn len(&self) -> Result<u64> {
        Err(Error::index_query("vector store unreachable"))
    }
}

/// Record log that rejects every call
pub(crate) struct UnavailableRecordLog;

#[async_trait]
impl RecordLog for UnavailableRecordLog {
    async fn append(&self, _exchange: &NewExchange) -> Result<ExchangeRecord> {
        Err(Error::storage_write("record store unreachable"))
    }

    async fn fetch_by_ids(&self, _ids: &[ExchangeId]) -> Result<HashMap<ExchangeId, ExchangeRecord>> {
        Err(Error::Other("record store unreachable".into()))
    }

    async fn get(&self, _id: ExchangeId) -> Result<Option<ExchangeRecord>> {
        Err(Error::Other("record store unreachable".into()))
    }

    async fn list_session(&self, _session_id: &str, _limit: usize) -> Result<Vec<ExchangeRecord>> {
        Err(Error::Other("record store unreachable".into()))
    }

    async fn count(&self) -> Result<u64> {
        Err(Error::Other("record store unreachable".into()))
    }
}

/// Enhancer with canned replies; `None` makes the call fail
pub(crate) struct ScriptedEnhancer {
    classify_reply: Option<String>,
    enhance_reply: Option<String>,
    memory_seen: Mutex<Vec<Option<ExchangeId>>>,
}

impl ScriptedEnhancer {
    pub fn new(classify_reply: Option<&str>, enhance_reply: Option<&str>) -> Self {
        Self {
            classify_reply: classify_reply.map(String::from),
            enhance_reply: enhance_reply.map(String::from),
            memory_seen: Mutex::new(Vec::new()),
        }
    }

    /// Ids of the recalled exchanges passed to each `enhance_text` call
    pub fn memory_seen(&self) -> Vec<Option<ExchangeId>> {
        self.memory_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptEnhancer for ScriptedEnhancer {
    async fn classify_needs_memory(&self, _prompt: &str, _history: &[ChatTurn]) -> Result<String> {
        self.classify_reply
            .clone()
            .ok_or_else(|| Error::Other("classifier offline".into()))
    }

    async fn enhance_text(
        &self,
        _prompt: &str,
        _history: &[ChatTurn],
        memory: Option<&SimilarExchange>,
    ) -> Result<String> {
        self.memory_seen.lock().unwrap().push(memory.map(|m| m.id));
        self.enhance_reply
            .clone()
            .ok_or_else(|| Error::Other("enhancer offline".into()))
    }
}
