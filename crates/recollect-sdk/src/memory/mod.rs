//! Hybrid Episodic Memory
//!
//! Two independently failing stores joined on [`ExchangeId`](recollect_core::ExchangeId):
//! - Record log: durable, append-only SQLite table of exchanges
//! - Vector index: embeddings of enhanced prompts in a separate SQLite file
//!
//! # Architecture
//!
//! ```text
//!   save_exchange ──► RecordLog::append ──► id ──► VectorIndex::upsert(id, enhanced)
//!                          │ fail: abort            │ fail: warn, save still succeeds
//!
//!   find_similar  ──► VectorIndex::query ──► [(id, distance)] ──► RecordLog::fetch_by_ids
//!                          │ fail: empty                                │ missing id: skip
//! ```

mod coordinator;
mod record_log;
mod types;
mod vector_index;
pub mod embeddings;

pub mod migrations;

pub use coordinator::MemoryCoordinator;
pub use embeddings::HashingEmbedder;
#[cfg(feature = "embeddings")]
pub use embeddings::FastEmbedder;
pub use record_log::SqliteRecordLog;
pub use types::{MemoryStats, SaveOutcome, SimilarExchange, VectorWriteStatus};
pub use vector_index::SqliteVectorIndex;
