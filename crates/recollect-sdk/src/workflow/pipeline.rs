//! One prompt-enhancement exchange, start to finish.

use std::sync::Arc;

use recollect_core::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::enhancer::{ChatTurn, PromptEnhancer};
use super::response::{fallback_prompt, ResponseParser};
use crate::memory::{MemoryCoordinator, SaveOutcome, SimilarExchange};
use crate::SDKResult;

/// Result of [`ExchangeWorkflow::run`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutcome {
    pub session_id: String,
    pub user_prompt: String,
    pub enhanced_prompt: String,
    pub requires_memory: bool,
    /// Past exchange handed to the enhancer, if any
    pub recalled: Option<SimilarExchange>,
    pub saved: SaveOutcome,
}

/// Classify, recall, enhance, save.
pub struct ExchangeWorkflow {
    memory: MemoryCoordinator,
    enhancer: Arc<dyn PromptEnhancer>,
    parser: ResponseParser,
    recall_k: usize,
}

impl ExchangeWorkflow {
    pub fn new(memory: MemoryCoordinator, enhancer: Arc<dyn PromptEnhancer>, recall_k: usize) -> SDKResult<Self> {
        let parser = ResponseParser::new().map_err(anyhow::Error::from)?;
        Ok(Self {
            memory,
            enhancer,
            parser,
            recall_k,
        })
    }

    /// Run one exchange in a fresh session.
    ///
    /// Classifier and enhancer failures degrade (no recall, fallback prompt);
    /// only an invalid prompt or a failed record write is an error.
    pub async fn run(&self, prompt: &str) -> Result<WorkflowOutcome> {
        if prompt.trim().is_empty() {
            return Err(Error::InvalidInput("prompt cannot be empty".into()));
        }

        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, "Starting exchange");

        let history = vec![ChatTurn::user(prompt)];

        let requires_memory = match self.enhancer.classify_needs_memory(prompt, &history).await {
            Ok(reply) => self.parser.requires_memory(&reply),
            Err(e) => {
                warn!(error = %e, "Intent classification failed; skipping recall");
                false
            }
        };

        let recalled = if requires_memory {
            self.recall(prompt).await
        } else {
            None
        };

        let enhanced_prompt = match self.enhancer.enhance_text(prompt, &history, recalled.as_ref()).await {
            Ok(reply) => self.parser.enhanced_prompt(&reply, prompt),
            Err(e) => {
                warn!(error = %e, "Enhancement failed; using fallback prompt");
                fallback_prompt(prompt)
            }
        };
        info!(session_id = %session_id, enhanced = %enhanced_prompt, "Enhanced prompt");

        let saved = self
            .memory
            .save_exchange_detailed(&session_id, prompt, Some(&enhanced_prompt))
            .await?;

        Ok(WorkflowOutcome {
            session_id,
            user_prompt: prompt.to_string(),
            enhanced_prompt,
            requires_memory,
            recalled,
            saved,
        })
    }

    async fn recall(&self, prompt: &str) -> Option<SimilarExchange> {
        match self.memory.find_similar(prompt, self.recall_k).await {
            Ok(hits) => {
                let top = hits.into_iter().next();
                if let Some(hit) = &top {
                    info!(id = %hit.id, distance = hit.distance, "Recalled past exchange");
                }
                top
            }
            Err(e) => {
                warn!(error = %e, "Recall failed; continuing without memory");
                None
            }
        }
    }
}
