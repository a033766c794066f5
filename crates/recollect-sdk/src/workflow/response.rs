//! Interpreting raw model replies.

use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Prefix of the prompt used when enhancement yields nothing usable
pub const FALLBACK_PREFIX: &str = "A photorealistic, cinematic image of: ";

/// Replies shorter than this are treated as failed enhancements
const MIN_ENHANCED_CHARS: usize = 10;

/// Enhanced prompt used when the model reply is empty, too short, or missing
pub fn fallback_prompt(user_prompt: &str) -> String {
    format!("{}{}", FALLBACK_PREFIX, user_prompt)
}

/// Compiled patterns for reply parsing. Build once, reuse.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    reasoning: Regex,
    intent_object: Regex,
}

impl ResponseParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            reasoning: Regex::new(r"(?s)<think>.*?</think>")?,
            intent_object: Regex::new(r#"\{[^}]*"requiresMemory"[^}]*\}"#)?,
        })
    }

    /// Drop `<think>...</think>` blocks and surrounding whitespace
    pub fn strip_reasoning(&self, raw: &str) -> String {
        self.reasoning.replace_all(raw, "").trim().to_string()
    }

    /// Read the `requiresMemory` flag from a classifier reply.
    ///
    /// Tries the whole reply as JSON, then the first embedded object that
    /// mentions the key. Anything unparseable reads as `false`.
    pub fn requires_memory(&self, raw: &str) -> bool {
        let cleaned = self.strip_reasoning(raw);
        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return flag(&value);
        }

        if let Some(found) = self.intent_object.find(&cleaned) {
            if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
                return flag(&value);
            }
        }

        warn!(reply = %raw, "Could not parse memory intent; assuming none");
        false
    }

    /// Extract the enhanced prompt from an enhancer reply.
    ///
    /// Accepts `{"newEnhancedPrompt": ...}`, a bare JSON string, or plain
    /// text (optionally quoted). Falls back to [`fallback_prompt`] when the
    /// result is empty or shorter than ten characters.
    pub fn enhanced_prompt(&self, raw: &str, user_prompt: &str) -> String {
        let cleaned = self.strip_reasoning(raw);

        let candidate = match serde_json::from_str::<Value>(&cleaned) {
            Ok(Value::String(text)) => text,
            Ok(value) => value
                .get("newEnhancedPrompt")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Err(_) => unquote(&cleaned).to_string(),
        };

        let candidate = candidate.trim();
        if candidate.chars().count() < MIN_ENHANCED_CHARS {
            warn!(reply = %raw, "Empty or short enhancement; using fallback");
            return fallback_prompt(user_prompt);
        }
        candidate.to_string()
    }
}

fn flag(value: &Value) -> bool {
    value
        .get("requiresMemory")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn unquote(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text.trim_matches('"')
    } else {
        text
    }
}
