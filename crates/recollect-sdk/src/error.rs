//! SDK Error Types
//!
//! Defines error types for the Recollect SDK.

use thiserror::Error;

/// SDK Result type alias
pub type SDKResult<T> = Result<T, SDKError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SDKError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Store or embedding error from the memory layer
    #[error(transparent)]
    Memory(#[from] recollect_core::Error),

    /// Database error while opening a store
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Feature not compiled in
    #[error("unsupported: {message}")]
    Unsupported { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SDKError {
    /// Create an unsupported-feature error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// The underlying memory error, if any
    pub fn as_memory(&self) -> Option<&recollect_core::Error> {
        match self {
            Self::Memory(e) => Some(e),
            _ => None,
        }
    }
}
