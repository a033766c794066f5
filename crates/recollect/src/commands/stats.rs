//! Store statistics.

use anyhow::{Context, Result};
use colored::Colorize;
use recollect_sdk::SDK;

use super::print_json;

/// Print record and vector counts.
pub async fn execute(sdk: &SDK, json: bool) -> Result<()> {
    let stats = sdk.memory().stats().await.context("Failed to get memory stats")?;

    if json {
        return print_json(&stats);
    }

    println!("{} Memory Statistics", "📊".cyan());
    println!();
    println!("  Exchanges: {}", stats.records.to_string().bold());
    println!("  Indexed:   {}", stats.vectors.to_string().green());
    if stats.unindexed > 0 {
        println!(
            "  Unindexed: {} {}",
            stats.unindexed.to_string().yellow(),
            "(no enhanced prompt, or index write failed)".dimmed()
        );
    }
    println!();
    println!("  Embedding model: {}", sdk.embedder().model_name().cyan());

    Ok(())
}
