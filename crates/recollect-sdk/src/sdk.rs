//! Main SDK Entry Point
//!
//! Provides the main SDK struct that ties together all components.

use std::sync::Arc;

use recollect_core::memory::Embedder;

use crate::config::EmbeddingBackend;
use crate::memory::{HashingEmbedder, MemoryCoordinator, SqliteRecordLog, SqliteVectorIndex};
use crate::workflow::{ExchangeWorkflow, PromptEnhancer};
use crate::{SDKConfig, SDKError, SDKResult};

/// Recollect SDK - Main entry point
///
/// Opens both stores once and hands out a [`MemoryCoordinator`] that shares
/// them. Construct at process start and pass it (or the coordinator) by
/// reference.
///
/// # Example
///
/// ```rust,no_run
/// use recollect_sdk::{SDK, SDKConfig};
///
/// async fn example() -> anyhow::Result<()> {
///     let sdk = SDK::new(SDKConfig::in_dir("/tmp/recollect"))?;
///
///     let id = sdk
///         .memory()
///         .save_exchange("s1", "a red castle", Some("A crimson medieval castle on a cliff"))
///         .await?;
///
///     let similar = sdk.memory().find_similar("castle at dusk", 3).await?;
///     assert!(similar.iter().any(|hit| hit.id == id));
///     Ok(())
/// }
/// ```
pub struct SDK {
    /// SDK configuration
    config: SDKConfig,

    /// Coordinator over the record log and vector index
    memory: MemoryCoordinator,

    /// Embedding function shared with the vector index
    embedder: Arc<dyn Embedder>,
}

impl SDK {
    /// Create a new SDK instance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - Either database cannot be opened or migrated
    /// - The configured embedding backend is not compiled in
    pub fn new(config: SDKConfig) -> SDKResult<Self> {
        config.validate()?;

        let embedder = build_embedder(&config)?;

        let records = SqliteRecordLog::open(&config.record_log_path, config.memory.storage_timeout())?;
        let vectors = SqliteVectorIndex::open(
            &config.vector_index_path,
            embedder.clone(),
            config.memory.embed_timeout(),
            config.memory.storage_timeout(),
        )?;

        tracing::info!(
            record_log = %config.record_log_path.display(),
            vector_index = %config.vector_index_path.display(),
            model = embedder.model_name(),
            "Opened memory stores"
        );

        Ok(Self {
            memory: MemoryCoordinator::new(Arc::new(records), Arc::new(vectors)),
            embedder,
            config,
        })
    }

    /// Get the SDK configuration
    pub fn config(&self) -> &SDKConfig {
        &self.config
    }

    /// Get the memory coordinator
    pub fn memory(&self) -> &MemoryCoordinator {
        &self.memory
    }

    /// Get the embedding function
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Build an enhancement workflow over this SDK's memory
    pub fn workflow(&self, enhancer: Arc<dyn PromptEnhancer>) -> SDKResult<ExchangeWorkflow> {
        ExchangeWorkflow::new(self.memory.clone(), enhancer, self.config.memory.recall_k)
    }
}

/// Construct the embedder selected by `config.embedding.backend`
pub fn build_embedder(config: &SDKConfig) -> SDKResult<Arc<dyn Embedder>> {
    match config.embedding.backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::new(config.embedding.hashing_dimensions))),
        #[cfg(feature = "embeddings")]
        EmbeddingBackend::Fastembed => Ok(Arc::new(crate::memory::FastEmbedder::new(
            config.embedding.show_download_progress,
        ))),
        #[cfg(not(feature = "embeddings"))]
        EmbeddingBackend::Fastembed => Err(SDKError::unsupported(
            "fastembed backend requires the `embeddings` feature",
        )),
    }
}
