//! Application state.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use recollect_sdk::SDK;

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Memory stores, opened once at startup
    pub sdk: SDK,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sdk = SDK::new(config.sdk.clone()).context("Failed to open memory stores")?;
        Ok(Self {
            config: Arc::new(config),
            sdk,
            start_time: Instant::now(),
        })
    }
}
