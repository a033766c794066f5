//! Recollect SDK - Hybrid Episodic Memory for Prompt Enhancement
//!
//! This crate provides the unified SDK for Recollect. All functionality
//! is accessible through this single crate, including:
//!
//! # Core Modules (from recollect-core)
//!
//! - **db** - Direct SQLite access to the record log
//! - **types** - Exchange ids, records and vector types
//!
//! # SDK Modules
//!
//! - **memory** - Record log and vector index adapters, embedders, and the
//!   coordinator that keeps the two consistent
//! - **workflow** - Classify, recall, enhance and save one exchange
//!
//! # Example
//!
//! ```rust,no_run
//! use recollect_sdk::{SDK, SDKConfig};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let sdk = SDK::new(SDKConfig {
//!         record_log_path: "memory.db".into(),
//!         vector_index_path: "vectors.db".into(),
//!         ..Default::default()
//!     })?;
//!
//!     sdk.memory()
//!         .save_exchange("s1", "a red castle", Some("A crimson medieval castle on a cliff"))
//!         .await?;
//!
//!     let similar = sdk.memory().find_similar("castle at dusk", 3).await?;
//!     println!("{} similar exchanges", similar.len());
//!
//!     Ok(())
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Re-export core modules from recollect-core
// ─────────────────────────────────────────────────────────────────────────────

/// Database access
pub use recollect_core::db;

/// Core types (ExchangeId, ExchangeRecord, VectorMatch, etc.)
pub use recollect_core::types;

/// Error types from core
pub use recollect_core::error as core_error;

// ─────────────────────────────────────────────────────────────────────────────
// SDK-specific modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod memory;

pub mod workflow;

pub mod utils;

pub mod config;
mod error;
mod sdk;

#[cfg(test)]
mod testing;

// Re-export main SDK types
pub use config::{EmbeddingBackend, EmbeddingConfig, MemoryConfig, SDKConfig};
pub use error::{SDKError, SDKResult};
pub use sdk::{build_embedder, SDK};

pub use recollect_core::{ExchangeId, ExchangeRecord};

pub use memory::{MemoryCoordinator, MemoryStats, SaveOutcome, SimilarExchange, VectorWriteStatus};

pub use workflow::{ExchangeWorkflow, PromptEnhancer, WorkflowOutcome};
