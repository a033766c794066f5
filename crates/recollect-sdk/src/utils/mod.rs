//! SDK Utilities
//!
//! Common utilities for the SDK.

mod blocking;
mod hashing;

pub use blocking::{run_blocking, with_timeout};
pub use hashing::{content_hash, digest};
