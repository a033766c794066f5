//! Prompt Enhancement Workflow
//!
//! Drives a single exchange through the memory store:
//! 1. Classify whether the prompt refers to an earlier session
//! 2. If so, recall the closest past exchange
//! 3. Enhance the prompt (with the recalled exchange as context)
//! 4. Save the exchange
//!
//! The model behind steps 1 and 3 is a [`PromptEnhancer`]; this crate ships
//! no client for one.

mod enhancer;
mod pipeline;
mod response;

pub use enhancer::{ChatRole, ChatTurn, PromptEnhancer};
pub use pipeline::{ExchangeWorkflow, WorkflowOutcome};
pub use response::{fallback_prompt, ResponseParser, FALLBACK_PREFIX};
