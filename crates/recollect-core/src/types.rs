//! Shared types for recollect-core.
//!
//! The record log and the vector index are joined on [`ExchangeId`]. Both
//! adapters bind the numeric id directly, so a malformed or non-positive id
//! is rejected here before either store is touched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier assigned by the record log at append time.
///
/// Always positive. Strictly increasing over the lifetime of a log and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ExchangeId(i64);

impl ExchangeId {
    /// Validate a raw id coming from a caller or a store.
    pub fn new(raw: i64) -> Result<Self, Error> {
        if raw <= 0 {
            return Err(Error::InvalidId(format!("{} (must be positive)", raw)));
        }
        Ok(Self(raw))
    }

    /// Raw integer value, as bound to SQL parameters.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ExchangeId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ExchangeId> for i64 {
    fn from(id: ExchangeId) -> Self {
        id.0
    }
}

impl FromStr for ExchangeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidId(format!("'{}' is not an integer", s)))?;
        Self::new(raw)
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record Log Types
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted prompt-enhancement exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: ExchangeId,
    pub session_id: String,
    pub user_prompt: String,
    pub enhanced_prompt: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExchangeRecord {
    /// Enhanced prompt if present and not blank
    pub fn enhanced_text(&self) -> Option<&str> {
        non_blank(self.enhanced_prompt.as_deref())
    }
}

/// Input for appending a new exchange
#[derive(Debug, Clone, Default)]
pub struct NewExchange {
    pub session_id: String,
    pub user_prompt: String,
    pub enhanced_prompt: Option<String>,
}

impl NewExchange {
    pub fn new(
        session_id: impl Into<String>,
        user_prompt: impl Into<String>,
        enhanced_prompt: Option<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_prompt: user_prompt.into(),
            enhanced_prompt,
        }
    }

    /// Enhanced prompt if present and not blank. No embedding is produced otherwise.
    pub fn enhanced_text(&self) -> Option<&str> {
        non_blank(self.enhanced_prompt.as_deref())
    }

    /// Reject inputs the record log must never receive.
    pub fn validate(&self) -> Result<(), Error> {
        if self.session_id.trim().is_empty() {
            return Err(Error::InvalidInput("session_id cannot be empty".into()));
        }
        if self.user_prompt.trim().is_empty() {
            return Err(Error::InvalidInput("user_prompt cannot be empty".into()));
        }
        Ok(())
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Vector Index Types
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata stored next to each embedding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub session_id: String,
}

/// A stored embedding. `id` references an [`ExchangeRecord`] that was committed first.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub id: ExchangeId,
    pub vector: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// One nearest-neighbor hit. Distance is computed per query and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: ExchangeId,
    /// Cosine distance, smaller is closer
    pub distance: f32,
    /// Hash of the text the vector was computed from
    pub content_hash: String,
}

/// Optional metadata filter for vector queries
#[derive(Debug, Clone, Default)]
pub struct VectorFilter {
    pub session_id: Option<String>,
}

impl VectorFilter {
    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_id_rejects_non_positive() {
        assert!(ExchangeId::new(1).is_ok());
        assert!(ExchangeId::new(0).is_err());
        assert!(ExchangeId::new(-7).is_err());
    }

    #[test]
    fn test_exchange_id_parse() {
        assert_eq!("42".parse::<ExchangeId>().unwrap().get(), 42);
        assert_eq!(" 7 ".parse::<ExchangeId>().unwrap().get(), 7);
        assert!("abc".parse::<ExchangeId>().is_err());
        assert!("4.2".parse::<ExchangeId>().is_err());
        assert!("-1".parse::<ExchangeId>().is_err());
        assert!("".parse::<ExchangeId>().is_err());
    }

    #[test]
    fn test_exchange_id_serde() {
        let id = ExchangeId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        assert_eq!(serde_json::from_str::<ExchangeId>("9").unwrap(), id);
        assert!(serde_json::from_str::<ExchangeId>("0").is_err());
    }

    #[test]
    fn test_enhanced_text_skips_blank() {
        let exchange = NewExchange::new("s1", "a castle", Some("   ".into()));
        assert!(exchange.enhanced_text().is_none());

        let exchange = NewExchange::new("s1", "a castle", None);
        assert!(exchange.enhanced_text().is_none());

        let exchange = NewExchange::new("s1", "a castle", Some("A stone castle".into()));
        assert_eq!(exchange.enhanced_text(), Some("A stone castle"));
    }

    #[test]
    fn test_new_exchange_validation() {
        assert!(NewExchange::new("s1", "prompt", None).validate().is_ok());
        assert!(NewExchange::new("", "prompt", None).validate().is_err());
        assert!(NewExchange::new("s1", "  ", None).validate().is_err());
    }
}
