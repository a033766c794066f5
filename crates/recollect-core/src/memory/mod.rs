//! Hybrid episodic memory: store contracts.
//!
//! Two heterogeneous stores are joined on [`ExchangeId`](crate::types::ExchangeId):
//!
//! ```text
//! write:  text ──▶ RecordLog.append ──▶ id ──▶ VectorIndex.upsert(id, enhanced)
//! read:   query ──▶ VectorIndex.query ──▶ [(id, distance)] ──▶ RecordLog.fetch_by_ids
//! ```
//!
//! The set of vector ids is always a subset of the record ids: a vector is
//! only written after its record commits, and neither store deletes.

mod traits;

pub use traits::*;
