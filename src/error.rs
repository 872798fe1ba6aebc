//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::codec::CodecError;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Capacity string did not match `<number><B|KB|MB|GB>`
    #[error("Invalid capacity format: {0} (use e.g. 100MB, 1GB or a byte count)")]
    InvalidCapacityFormat(String),

    /// A configuration value other than the capacity is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single entry is larger than the whole cache
    #[error("Entry of {size} bytes exceeds cache capacity of {capacity} bytes")]
    EntrySizeExceedsCapacity { size: u64, capacity: u64 },

    /// Decoding a stored payload failed
    #[error("Failed to read key '{key}': {reason}")]
    CacheReadFailure { key: String, reason: String },

    /// Serializing or encoding a value failed
    #[error("Failed to write key '{key}': {reason}")]
    CacheWriteFailure { key: String, reason: String },

    /// Default priority formula produced an unusable score
    #[error("Priority computation failed: {0}")]
    PriorityComputation(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// Translates a codec failure on the read path into a per-key read failure.
    pub fn read_failure(key: &str, err: CodecError) -> Self {
        CacheError::CacheReadFailure {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }

    /// Translates a codec or serialization failure on the write path.
    pub fn write_failure(key: &str, err: impl std::fmt::Display) -> Self {
        CacheError::CacheWriteFailure {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::InvalidCapacityFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::EntrySizeExceedsCapacity { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::CacheReadFailure { .. }
            | CacheError::CacheWriteFailure { .. }
            | CacheError::InvalidConfig(_)
            | CacheError::PriorityComputation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
