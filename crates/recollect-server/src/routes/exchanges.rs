//! Exchange routes.
//!
//! Provides REST API endpoints over the episodic memory store:
//! - POST /exchanges - Save an exchange
//! - GET /exchanges/similar - Similarity search
//! - GET /exchanges/{id} - Direct lookup
//! - GET /sessions/{session_id}/exchanges - Session history
//! - GET /stats - Record and vector counts

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use recollect_core::{Error, ExchangeId, ExchangeRecord};
use recollect_sdk::{MemoryStats, SimilarExchange, VectorWriteStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Default page size for session history
const DEFAULT_SESSION_LIMIT: usize = 50;

/// Create exchanges router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exchanges", post(save_exchange))
        .route("/exchanges/similar", get(find_similar))
        .route("/exchanges/{id}", get(get_exchange))
        .route("/sessions/{session_id}/exchanges", get(list_session))
        .route("/stats", get(get_stats))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveExchangeRequest {
    pub session_id: String,
    pub user_prompt: String,
    pub enhanced_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveExchangeResponse {
    pub id: ExchangeId,
    pub vector_status: VectorWriteStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarQuery {
    pub query: String,
    /// Signed on purpose: zero or negative yields an empty result
    pub k: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarResponse {
    pub query: String,
    pub results: Vec<SimilarExchange>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListSessionQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub id: ExchangeId,
    pub session_id: String,
    pub user_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<ExchangeRecord> for ExchangeResponse {
    fn from(record: ExchangeRecord) -> Self {
        Self {
            id: record.id,
            session_id: record.session_id,
            user_prompt: record.user_prompt,
            enhanced_prompt: record.enhanced_prompt,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExchangesResponse {
    pub exchanges: Vec<ExchangeResponse>,
    pub total: usize,
}

// ============================================================================
// Route Handlers
// ============================================================================

fn error_response(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::InvalidInput(_) | Error::InvalidId(_) => StatusCode::BAD_REQUEST,
        Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Save an exchange
pub async fn save_exchange(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveExchangeRequest>,
) -> Result<(StatusCode, Json<SaveExchangeResponse>), (StatusCode, String)> {
    let outcome = state
        .sdk
        .memory()
        .save_exchange_detailed(&req.session_id, &req.user_prompt, req.enhanced_prompt.as_deref())
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(SaveExchangeResponse {
            id: outcome.id,
            vector_status: outcome.vector,
        }),
    ))
}

/// Similarity search
pub async fn find_similar(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<SimilarResponse>, (StatusCode, String)> {
    let k = state.config.sdk.memory.resolve_k(query.k);
    let memory = state.sdk.memory();

    let results = match &query.session_id {
        Some(session_id) => memory.find_similar_in_session(&query.query, k, session_id).await,
        None => memory.find_similar(&query.query, k).await,
    }
    .map_err(error_response)?;

    let total = results.len();
    Ok(Json(SimilarResponse {
        query: query.query,
        results,
        total,
    }))
}

/// Get a single exchange
pub async fn get_exchange(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExchangeResponse>, (StatusCode, String)> {
    let id: ExchangeId = id.parse().map_err(error_response)?;

    let record = state
        .sdk
        .memory()
        .get_exchange(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Exchange not found: {}", id)))?;

    Ok(Json(record.into()))
}

/// List a session's exchanges, oldest first
pub async fn list_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<ListSessionQuery>,
) -> Result<Json<ListExchangesResponse>, (StatusCode, String)> {
    let records = state
        .sdk
        .memory()
        .session_history(&session_id, query.limit.unwrap_or(DEFAULT_SESSION_LIMIT))
        .await
        .map_err(error_response)?;

    let total = records.len();
    Ok(Json(ListExchangesResponse {
        exchanges: records.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Record and vector counts
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<MemoryStats>, (StatusCode, String)> {
    let stats = state.sdk.memory().stats().await.map_err(error_response)?;
    Ok(Json(stats))
}
