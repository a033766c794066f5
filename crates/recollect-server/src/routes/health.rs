//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: HealthComponents,
    pub metrics: HealthMetrics,
}

#[derive(Serialize)]
pub struct HealthComponents {
    pub record_log: bool,
    pub vector_index: bool,
}

#[derive(Serialize)]
pub struct HealthMetrics {
    pub exchanges: u64,
    pub indexed: u64,
}

/// Health check endpoint
///
/// A reachable record log with an unreachable index is "degraded": saves
/// still succeed but similarity search returns nothing.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let memory = state.sdk.memory();

    let records = memory.record_log().count().await;
    let vectors = memory.vector_index().len().await;

    let status = match (&records, &vectors) {
        (Ok(_), Ok(_)) => "healthy",
        (Ok(_), Err(_)) => "degraded",
        (Err(_), _) => "unhealthy",
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: HealthComponents {
            record_log: records.is_ok(),
            vector_index: vectors.is_ok(),
        },
        metrics: HealthMetrics {
            exchanges: records.unwrap_or(0),
            indexed: vectors.unwrap_or(0),
        },
    })
}
