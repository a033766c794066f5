//! Exchange commands: save, similar, show, session.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use recollect_core::ExchangeId;
use recollect_sdk::{ExchangeRecord, SimilarExchange, VectorWriteStatus, SDK};

use super::print_json;
use crate::cli::{SaveArgs, SessionArgs, SimilarArgs};

const PREVIEW_CHARS: usize = 100;

/// Save an exchange.
pub async fn save(args: SaveArgs, sdk: &SDK, json: bool) -> Result<()> {
    let outcome = sdk
        .memory()
        .save_exchange_detailed(&args.session_id, &args.user_prompt, args.enhanced.as_deref())
        .await
        .context("Failed to save exchange")?;

    if json {
        return print_json(&outcome);
    }

    println!("{} Saved exchange {}", "✓".green(), outcome.id.to_string().cyan());
    match &outcome.vector {
        VectorWriteStatus::Indexed => println!("  Indexed for similarity search"),
        VectorWriteStatus::Skipped => println!("  {}", "No enhanced prompt; not indexed".dimmed()),
        VectorWriteStatus::Degraded(reason) => {
            println!("{} Not indexed: {}", "⚠".yellow(), reason);
            println!("  Retrievable by id and session, but not by similarity");
        }
    }
    Ok(())
}

/// Find similar exchanges.
pub async fn similar(args: SimilarArgs, sdk: &SDK, json: bool) -> Result<()> {
    let k = sdk.config().memory.resolve_k(args.k);

    let hits = match &args.session {
        Some(session_id) => sdk.memory().find_similar_in_session(&args.query, k, session_id).await,
        None => sdk.memory().find_similar(&args.query, k).await,
    }
    .context("Failed to search exchanges")?;

    if json {
        return print_json(&hits);
    }

    if hits.is_empty() {
        println!("{} No similar exchanges found", "⚠".yellow());
        return Ok(());
    }

    println!("{} Found {} similar exchanges:", "✓".green(), hits.len());
    println!();
    for (i, hit) in hits.iter().enumerate() {
        print_similar(i + 1, hit);
    }
    Ok(())
}

/// Show one exchange.
pub async fn show(id: &str, sdk: &SDK, json: bool) -> Result<()> {
    let id: ExchangeId = id.parse().context("Invalid exchange id")?;

    let record = sdk
        .memory()
        .get_exchange(id)
        .await
        .context("Failed to get exchange")?
        .ok_or_else(|| anyhow!("Exchange not found: {}", id))?;

    if json {
        return print_json(&record);
    }

    println!("{} {}", "Exchange".bold(), record.id.to_string().cyan());
    println!("  Session:  {}", record.session_id);
    println!("  Saved:    {}", record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Prompt:   {}", record.user_prompt);
    match record.enhanced_text() {
        Some(enhanced) => println!("  Enhanced: {}", enhanced),
        None => println!("  Enhanced: {}", "(none)".dimmed()),
    }
    Ok(())
}

/// List a session's exchanges.
pub async fn session(args: SessionArgs, sdk: &SDK, json: bool) -> Result<()> {
    let records = sdk
        .memory()
        .session_history(&args.session_id, args.limit)
        .await
        .context("Failed to list session exchanges")?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("{} No exchanges in session {}", "⚠".yellow(), args.session_id);
        return Ok(());
    }

    println!("{} {} exchanges in session {}:", "✓".green(), records.len(), args.session_id.cyan());
    println!();
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_similar(index: usize, hit: &SimilarExchange) {
    println!(
        "  {}. {} [{}] <{}>",
        index,
        hit.id.to_string().cyan(),
        format!("{:.4}", hit.distance).yellow(),
        hit.session_id.dimmed()
    );
    println!("     Prompt:   {}", preview(&hit.user_prompt));
    if let Some(enhanced) = &hit.enhanced_prompt {
        println!("     Enhanced: {}", preview(enhanced));
    }
    println!();
}

fn print_record(record: &ExchangeRecord) {
    println!(
        "  {} {} {}",
        record.id.to_string().cyan(),
        record.timestamp.format("%H:%M:%S").to_string().dimmed(),
        preview(&record.user_prompt)
    );
    if let Some(enhanced) = record.enhanced_text() {
        println!("     → {}", preview(enhanced));
    }
}

/// Truncate for display on a char boundary
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(150);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);
    }
}
