//! Embedding Functions
//!
//! Two implementations of [`Embedder`]:
//!
//! - [`FastEmbedder`]: local all-MiniLM-L6-v2 via `fastembed` (384 dimensions),
//!   lazily loaded, inference on the blocking pool. Requires the `embeddings` feature.
//! - [`HashingEmbedder`]: deterministic signed feature hashing over lowercase
//!   word tokens. No model download; used when `embeddings` is off and in tests.
//!
//! Neither returns a zero vector: text that produces no signal is an error.

use async_trait::async_trait;
use recollect_core::memory::Embedder;
use recollect_core::{Error, Result};

use crate::utils::digest;

/// Embedding dimensions for all-MiniLM-L6-v2
pub const FASTEMBED_DIMENSIONS: usize = 384;

/// Model name recorded for fastembed vectors
pub const FASTEMBED_MODEL: &str = "all-MiniLM-L6-v2";

// ─────────────────────────────────────────────────────────────────────────────
// Distance
// ─────────────────────────────────────────────────────────────────────────────

/// Compute cosine similarity between two vectors
///
/// Returns a value between -1.0 and 1.0. Mismatched lengths and zero-norm
/// vectors return 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Cosine distance in [0, 2], smaller is closer
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

fn l2_normalize(vector: &mut [f32]) -> bool {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    for x in vector.iter_mut() {
        *x /= norm;
    }
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Hashing Embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            model_name: format!("hashing-{}", dimensions),
        }
    }

    /// Synchronous embedding, shared by the async trait method
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimensions == 0 {
            return Err(Error::embedding("hashing embedder has zero dimensions"));
        }

        let lowered = text.to_lowercase();
        let mut vector = vec![0.0f32; self.dimensions];
        let mut tokens = 0usize;

        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = digest(token);
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&hash[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if hash[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            return Err(Error::embedding("text has no tokens to embed"));
        }
        if !l2_normalize(&mut vector) {
            return Err(Error::embedding("token hashes cancelled out"));
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fastembed Embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Local sentence-transformer embedder
#[cfg(feature = "embeddings")]
pub struct FastEmbedder {
    model: std::sync::Arc<tokio::sync::RwLock<Option<std::sync::Arc<fastembed::TextEmbedding>>>>,
    show_download_progress: bool,
}

#[cfg(feature = "embeddings")]
impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(feature = "embeddings")]
impl FastEmbedder {
    /// Create a new embedder. The model loads on first use.
    pub fn new(show_download_progress: bool) -> Self {
        Self {
            model: std::sync::Arc::new(tokio::sync::RwLock::new(None)),
            show_download_progress,
        }
    }

    /// Initialize the embedding model (lazy loading)
    async fn ensure_model(&self) -> Result<std::sync::Arc<fastembed::TextEmbedding>> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        if let Some(model) = self.model.read().await.as_ref() {
            return Ok(model.clone());
        }

        let mut model_guard = self.model.write().await;
        if let Some(model) = model_guard.as_ref() {
            return Ok(model.clone());
        }

        tracing::info!("Loading embedding model: {}", FASTEMBED_MODEL);
        let start = std::time::Instant::now();

        let show_download_progress = self.show_download_progress;
        let model = tokio::task::spawn_blocking(move || {
            let mut init_options = InitOptions::default();
            init_options.model_name = EmbeddingModel::AllMiniLML6V2;
            init_options.show_download_progress = show_download_progress;
            TextEmbedding::try_new(init_options)
        })
        .await
        .map_err(|e| Error::embedding(format!("model loader task failed: {}", e)))?
        .map_err(|e| Error::embedding(format!("Failed to load embedding model: {}", e)))?;

        tracing::info!("Embedding model loaded in {:?}", start.elapsed());

        let model = std::sync::Arc::new(model);
        *model_guard = Some(model.clone());
        Ok(model)
    }

    /// Check if the model is loaded
    pub async fn is_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }
}

#[cfg(feature = "embeddings")]
#[async_trait]
impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        FASTEMBED_MODEL
    }

    fn dimensions(&self) -> usize {
        FASTEMBED_DIMENSIONS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::embedding("cannot embed blank text"));
        }

        let model = self.ensure_model().await?;
        let text = text.to_string();

        let embeddings = tokio::task::spawn_blocking(move || model.embed(vec![text], None))
            .await
            .map_err(|e| Error::embedding(format!("embedding task failed: {}", e)))?
            .map_err(|e| Error::embedding(format!("Failed to generate embedding: {}", e)))?;

        let vector = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("No embedding generated"))?;

        if vector.len() != FASTEMBED_DIMENSIONS {
            return Err(Error::DimensionMismatch {
                expected: FASTEMBED_DIMENSIONS,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}
