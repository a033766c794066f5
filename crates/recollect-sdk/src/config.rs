//! SDK Configuration
//!
//! Defines configuration options for the Recollect SDK.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// SDK configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SDKConfig {
    /// Path to the record log SQLite file
    pub record_log_path: PathBuf,

    /// Path to the vector index SQLite file
    pub vector_index_path: PathBuf,

    /// Memory coordinator configuration
    pub memory: MemoryConfig,

    /// Embedding function configuration
    pub embedding: EmbeddingConfig,
}

impl Default for SDKConfig {
    fn default() -> Self {
        Self {
            record_log_path: PathBuf::from("memory.db"),
            vector_index_path: PathBuf::from("vectors.db"),
            memory: MemoryConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Memory coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Results returned by a similarity search when the caller gives no k (default: 3)
    pub default_k: usize,

    /// Past exchanges pulled into the enhancement workflow (default: 1)
    pub recall_k: usize,

    /// Upper bound on one embedding computation in milliseconds (default: 10000)
    pub embed_timeout_ms: u64,

    /// Upper bound on one store round trip in milliseconds (default: 5000)
    pub storage_timeout_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_k: 3,
            recall_k: 1,
            embed_timeout_ms: 10_000,
            storage_timeout_ms: 5_000,
        }
    }
}

impl MemoryConfig {
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    /// Turn a caller-supplied `k` into a result count.
    ///
    /// Missing means `default_k`; zero or negative means no results.
    pub fn resolve_k(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default_k,
            Some(k) if k <= 0 => 0,
            Some(k) => usize::try_from(k).unwrap_or(usize::MAX),
        }
    }
}

/// Which embedding backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Local fastembed model (requires the `embeddings` feature)
    Fastembed,
    /// Deterministic feature hashing, no model download
    Hashing,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "embeddings") {
            Self::Fastembed
        } else {
            Self::Hashing
        }
    }
}

/// Embedding function configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend to use
    pub backend: EmbeddingBackend,

    /// Dimensions for the hashing backend (default: 256)
    pub hashing_dimensions: usize,

    /// Show model download progress for fastembed (default: false)
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            hashing_dimensions: 256,
            show_download_progress: false,
        }
    }
}

impl SDKConfig {
    /// Create a config with both stores under `data_dir`
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            record_log_path: data_dir.join("memory.db"),
            vector_index_path: data_dir.join("vectors.db"),
            ..Default::default()
        }
    }

    /// Set the record log path
    pub fn with_record_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_log_path = path.into();
        self
    }

    /// Set the vector index path
    pub fn with_vector_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.vector_index_path = path.into();
        self
    }

    /// Set memory configuration
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Set embedding configuration
    pub fn with_embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.embedding = embedding;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.record_log_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingPath("record_log_path"));
        }

        if self.vector_index_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingPath("vector_index_path"));
        }

        if self.record_log_path == self.vector_index_path {
            return Err(ConfigValidationError::InvalidValue {
                field: "vector_index_path".into(),
                message: "must differ from record_log_path".into(),
            });
        }

        if self.memory.default_k == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "memory.default_k".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.memory.embed_timeout_ms == 0 || self.memory.storage_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "memory.*_timeout_ms".into(),
                message: "timeouts must be greater than 0".into(),
            });
        }

        if self.embedding.backend == EmbeddingBackend::Hashing && self.embedding.hashing_dimensions == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "embedding.hashing_dimensions".into(),
                message: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{0} is required")]
    MissingPath(&'static str),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SDKConfig::default();
        assert_eq!(config.memory.default_k, 3);
        assert_eq!(config.memory.recall_k, 1);
        assert_eq!(config.embedding.hashing_dimensions, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SDKConfig::in_dir("/data")
            .with_vector_index("/other/vectors.db");

        assert_eq!(config.record_log_path, PathBuf::from("/data/memory.db"));
        assert_eq!(config.vector_index_path, PathBuf::from("/other/vectors.db"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = SDKConfig::default();
        config.vector_index_path = config.record_log_path.clone();
        assert!(config.validate().is_err()); // Shared file

        let mut config = SDKConfig::default();
        config.memory.default_k = 0;
        assert!(config.validate().is_err());

        let mut config = SDKConfig::default();
        config.memory.embed_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SDKConfig::default();
        config.embedding.backend = EmbeddingBackend::Hashing;
        config.embedding.hashing_dimensions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_k() {
        let memory = MemoryConfig::default();
        assert_eq!(memory.resolve_k(None), 3);
        assert_eq!(memory.resolve_k(Some(7)), 7);
        assert_eq!(memory.resolve_k(Some(0)), 0);
        assert_eq!(memory.resolve_k(Some(-4)), 0);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: SDKConfig = serde_json::from_str(r#"{"memory": {"default_k": 5}}"#).unwrap();
        assert_eq!(config.memory.default_k, 5);
        assert_eq!(config.memory.recall_k, 1);
        assert_eq!(config.record_log_path, PathBuf::from("memory.db"));
    }
}
