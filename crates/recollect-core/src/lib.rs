//! recollect-core - Core library for Recollect
//!
//! This crate provides the pieces shared by the SDK, CLI and server:
//!
//! - **types**: exchange records, strongly typed ids, vector index types
//! - **memory**: the `RecordLog`, `VectorIndex` and `Embedder` contracts
//! - **db**: the SQLite-backed record log
//! - **error**: the error taxonomy for store operations

pub mod db;
pub mod error;
pub mod memory;
pub mod types;

// Re-export commonly used types
pub use db::{CommitGate, Database};
pub use error::{Error, Result};
pub use types::{ExchangeId, ExchangeRecord, NewExchange};
