//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheEngine, StatsSnapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, PredictionsResponse, SetRequest,
    SetResponse,
};

/// Application state shared across all handlers.
///
/// One lock guards the whole engine: store, counters and predictor.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache engine
    pub cache: Arc<RwLock<CacheEngine>>,
}

impl AppState {
    /// Creates a new AppState around an engine.
    pub fn new(cache: CacheEngine) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails when the configured capacity or encryption key is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(CacheEngine::from_config(config)?))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(&req.key, &req.value, req.options())?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Takes the write lock: reads bump recency, counters and the predictor.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let mut cache = state.cache.write().await;
    match cache.get_json(&key)? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    if cache.delete(&key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.write().await.clear();
    Json(ClearResponse::new())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /predictions
pub async fn predictions_handler(State(state): State<AppState>) -> Json<PredictionsResponse> {
    let cache = state.cache.read().await;
    Json(PredictionsResponse {
        keys: cache.predictions(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
