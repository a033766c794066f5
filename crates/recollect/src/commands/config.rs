//! Show the effective configuration.

use anyhow::{Context, Result};
use colored::Colorize;

use super::print_json;
use crate::config::Config;

/// Print where settings come from and what they resolve to.
pub fn execute(config: &Config, json: bool) -> Result<()> {
    if json {
        return print_json(config);
    }

    let config_path = Config::config_path();
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config_path.display())
    };

    println!("{} {}", "Config file:".bold(), source);
    println!("  Record log:   {}", config.record_log_path().display().to_string().cyan());
    println!("  Vector index: {}", config.vector_index_path().display().to_string().cyan());
    println!();

    let rendered = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", rendered);
    Ok(())
}
