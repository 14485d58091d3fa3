//! HTTP handlers for the datastore routes
//!
//! Each handler forwards to one [`DataStore`] operation and maps its result
//! onto a status code. Store calls that may flush the snapshot run on the
//! blocking thread pool.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use sysinfo::System;
use tracing::{debug, error};

use crate::error::{ErrorKind, StoreError};
use crate::store::{DataStore, StoreStats};

/// Shared application state
pub type AppState = Arc<DataStore>;

/// Plain-text reply: status code and message body
pub type TextReply = (StatusCode, String);

/// Query parameters for `POST /datastore/create`
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub key: String,
    pub value: String,
    /// TTL in seconds
    pub ttl: Option<i64>,
}

/// Query parameters for routes addressing one key
#[derive(Debug, Deserialize)]
pub struct KeyParams {
    pub key: String,
}

/// Query parameters for `POST /datastore/batchCreate`
#[derive(Debug, Deserialize)]
pub struct BatchParams {
    /// TTL in seconds, applied to every pair
    pub ttl: Option<i64>,
}

/// Response for `POST /datastore/purge`
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    /// Number of expired entries removed
    pub removed: usize,
}

/// Store and system statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Entry counts and memory used by live data
    pub store: StoreStats,
    /// Total system memory in MB
    pub total_memory_mb: f64,
    /// Used system memory in MB
    pub used_memory_mb: f64,
}

/// Create a key-value pair
pub async fn create_handler(
    State(store): State<AppState>,
    Query(params): Query<CreateParams>,
) -> Result<TextReply, TextReply> {
    debug!("HTTP create '{}' (ttl: {:?})", params.key, params.ttl);

    run_blocking(move || store.create(&params.key, &params.value, params.ttl)).await?;
    Ok((StatusCode::OK, "Key-Value pair added".to_string()))
}

/// Read the value of a key
pub async fn read_handler(
    State(store): State<AppState>,
    Query(params): Query<KeyParams>,
) -> TextReply {
    debug!("HTTP read '{}'", params.key);

    match store.read(&params.key) {
        Some(value) => (StatusCode::OK, value),
        None => (StatusCode::NOT_FOUND, "Key not found".to_string()),
    }
}

/// Delete a key
pub async fn delete_handler(
    State(store): State<AppState>,
    Query(params): Query<KeyParams>,
) -> Result<TextReply, TextReply> {
    debug!("HTTP delete '{}'", params.key);

    let outcome = run_blocking(move || store.delete(&params.key)).await?;
    Ok((StatusCode::OK, outcome.message().to_string()))
}

/// Create every pair of the JSON body
pub async fn batch_create_handler(
    State(store): State<AppState>,
    Query(params): Query<BatchParams>,
    Json(pairs): Json<HashMap<String, String>>,
) -> Result<TextReply, TextReply> {
    debug!("HTTP batch create of {} pairs (ttl: {:?})", pairs.len(), params.ttl);

    run_blocking(move || store.batch_create(pairs, params.ttl)).await?;
    Ok((StatusCode::OK, "Batch created".to_string()))
}

/// Remove expired entries
pub async fn purge_handler(
    State(store): State<AppState>,
) -> Result<Json<PurgeResponse>, TextReply> {
    let removed = run_blocking(move || store.purge_expired()).await?;
    Ok(Json(PurgeResponse { removed }))
}

/// Get store and system statistics
pub async fn stats_handler(State(store): State<AppState>) -> impl IntoResponse {
    let mut sys = System::new();
    sys.refresh_memory();

    let total_mem_bytes = sys.total_memory();
    let used_mem_bytes = total_mem_bytes.saturating_sub(sys.available_memory());

    let stats = StatsResponse {
        store: store.stats(),
        total_memory_mb: total_mem_bytes as f64 / 1024.0 / 1024.0,
        used_memory_mb: used_mem_bytes as f64 / 1024.0 / 1024.0,
    };

    (StatusCode::OK, Json(stats))
}

/// Map a store error onto an HTTP reply
pub fn error_reply(err: StoreError) -> TextReply {
    let status = match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Io => {
            error!("Store I/O failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

/// Run a store operation on the blocking pool
async fn run_blocking<T, F>(op: F) -> Result<T, TextReply>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result.map_err(error_reply),
        Err(e) => {
            error!("Store task failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()))
        }
    }
}
