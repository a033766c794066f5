//! Error types for recollect-core.

use thiserror::Error;

/// Result type alias using recollect-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for memory store operations
#[derive(Error, Debug)]
pub enum Error {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    // Store errors
    /// Record log append failed. Fatal to a save: no id was produced.
    #[error("Record log write failed: {0}")]
    StorageWrite(String),

    /// Vector index upsert failed after the record was committed.
    #[error("Vector index write failed: {0}")]
    IndexWrite(String),

    /// Vector index could not answer a query.
    #[error("Vector index query failed: {0}")]
    IndexQuery(String),

    // Embedding errors
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    // Validation errors
    #[error("Invalid exchange id: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a record log write error
    pub fn storage_write(message: impl Into<String>) -> Self {
        Self::StorageWrite(message.into())
    }

    /// Create a vector index write error
    pub fn index_write(message: impl Into<String>) -> Self {
        Self::IndexWrite(message.into())
    }

    /// Create a vector index query error
    pub fn index_query(message: impl Into<String>) -> Self {
        Self::IndexQuery(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    /// Check if this is a fatal record log write failure
    pub fn is_storage_write(&self) -> bool {
        matches!(self, Self::StorageWrite(_))
    }

    /// Check if this error came from the vector index side
    pub fn is_index_failure(&self) -> bool {
        matches!(
            self,
            Self::IndexWrite(_) | Self::IndexQuery(_) | Self::Embedding(_) | Self::DimensionMismatch { .. }
        )
    }

    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error was caused by caller input
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidId(_) | Self::InvalidInput(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_predicates() {
        let err = Error::storage_write("disk full");
        assert!(err.is_storage_write());
        assert!(!err.is_index_failure());
        assert!(err.to_string().contains("disk full"));

        assert!(Error::index_write("backend down").is_index_failure());
        assert!(Error::index_query("backend down").is_index_failure());
        assert!(Error::embedding("model missing").is_index_failure());

        let err = Error::timeout("embed", 250);
        assert!(err.is_timeout());
        assert!(err.to_string().contains("250"));

        assert!(Error::InvalidId("0".into()).is_invalid_input());
    }
}
