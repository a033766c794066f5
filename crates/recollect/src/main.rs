//! recollect - Episodic Memory CLI
//!
//! Save prompt-enhancement exchanges and find similar past ones.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("recollect=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;
    tracing::debug!(
        record_log = %config.record_log_path().display(),
        vector_index = %config.vector_index_path().display(),
        "Loaded configuration"
    );

    // Commands that do not touch the stores
    match cli.command {
        Commands::Config => return commands::config::execute(&config, cli.json),
        Commands::Version => {
            println!("recollect {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let sdk = commands::open_sdk(&config)?;

    match cli.command {
        Commands::Save(args) => commands::exchange::save(args, &sdk, cli.json).await,
        Commands::Similar(args) => commands::exchange::similar(args, &sdk, cli.json).await,
        Commands::Show { id } => commands::exchange::show(&id, &sdk, cli.json).await,
        Commands::Session(args) => commands::exchange::session(args, &sdk, cli.json).await,
        Commands::Stats => commands::stats::execute(&sdk, cli.json).await,
        Commands::Config | Commands::Version => Ok(()),
    }
}
