//! Command implementations for recollect CLI.
//!
//! Each submodule implements the logic for a command group. Store access is
//! direct through the SDK; no server required.

pub mod config;
pub mod exchange;
pub mod stats;

use anyhow::{Context, Result};
use recollect_sdk::SDK;

use crate::config::Config;

/// Open both stores with the effective configuration.
pub fn open_sdk(config: &Config) -> Result<SDK> {
    SDK::new(config.sdk_config()).context("Failed to open memory stores")
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
