//! The language-model seam of the workflow.

use async_trait::async_trait;
use recollect_core::Result;
use serde::{Deserialize, Serialize};

use crate::memory::SimilarExchange;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the current session's conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Intent classification and prompt enhancement, backed by some model.
///
/// Both methods return the model's raw reply. The workflow strips reasoning
/// blocks and parses the JSON payload itself, so implementations stay thin
/// wrappers around a chat call.
#[async_trait]
pub trait PromptEnhancer: Send + Sync {
    /// Decide whether `prompt` refers to an earlier session.
    ///
    /// Expected reply: `{"requiresMemory": true|false}`.
    async fn classify_needs_memory(&self, prompt: &str, history: &[ChatTurn]) -> Result<String>;

    /// Rewrite `prompt` into a detailed image prompt, optionally building on a
    /// recalled exchange.
    ///
    /// Expected reply: `{"newEnhancedPrompt": "..."}`.
    async fn enhance_text(
        &self,
        prompt: &str,
        history: &[ChatTurn],
        memory: Option<&SimilarExchange>,
    ) -> Result<String>;
}
