//! Memory Type Definitions
//!
//! Result types returned by the memory coordinator.

use chrono::{DateTime, Utc};
use recollect_core::{ExchangeId, ExchangeRecord};
use serde::{Deserialize, Serialize};

/// What happened to the vector half of a save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum VectorWriteStatus {
    /// Embedding stored under the new id
    Indexed,
    /// No enhanced prompt, nothing to embed
    Skipped,
    /// Record committed but the index write failed; the exchange is
    /// retrievable by id but invisible to similarity search
    Degraded(String),
}

impl VectorWriteStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Skipped => "skipped",
            Self::Degraded(_) => "degraded",
        }
    }
}

impl std::fmt::Display for VectorWriteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degraded(reason) => write!(f, "degraded ({})", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Outcome of a save: the committed id plus the index status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub id: ExchangeId,
    pub vector: VectorWriteStatus,
}

/// A similarity hit joined with its record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarExchange {
    pub id: ExchangeId,
    pub session_id: String,
    pub user_prompt: String,
    pub enhanced_prompt: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Cosine distance to the query, smaller is closer
    pub distance: f32,
}

impl SimilarExchange {
    pub fn from_record(record: ExchangeRecord, distance: f32) -> Self {
        Self {
            id: record.id,
            session_id: record.session_id,
            user_prompt: record.user_prompt,
            enhanced_prompt: record.enhanced_prompt,
            timestamp: record.timestamp,
            distance,
        }
    }
}

/// Counts across both stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    /// Records in the log
    pub records: u64,
    /// Vectors in the index
    pub vectors: u64,
    /// Records without a vector (skipped or degraded saves)
    pub unindexed: u64,
}
