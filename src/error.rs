//! Error types for the lake cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its storage gateway.
///
/// Absence of a key is not an error: cache lookups return `Ok(None)`.
/// `NotFound` only exists for the HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying insert/update/delete/query/count call failed
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Stored payload could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Periodic task could not be registered or cancelled
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(e: rusqlite::Error) -> Self {
        CacheError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Codec(e.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Storage(_) | CacheError::Codec(_) | CacheError::Scheduler(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the lake cache.
pub type Result<T> = std::result::Result<T, CacheError>;
