//! recollect-server - Episodic memory server
//!
//! REST API over the record log and vector index.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so the log file location is known
    let config = config::Config::load()?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;

    // Initialize logging: human-readable stdout plus JSON file
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(fmt::layer().json().with_writer(Mutex::new(log_file)))
        .with(
            EnvFilter::from_default_env()
                .add_directive("recollect_server=info".parse()?)
                .add_directive("recollect_sdk=info".parse()?),
        )
        .init();

    info!("recollect-server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        data_dir = %config.data_dir.display(),
        config_file = %config.config_path.display(),
        "Config loaded"
    );

    let bind = config.bind;
    let state = Arc::new(state::AppState::new(config)?);
    let app = routes::create_router(state);

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(%bind, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
