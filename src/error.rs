//! Error types for the cache server
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
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Request body could not be fully drained
    #[error("Read failure: {0}")]
    ReadFailure(String),

    /// Missing, malformed, invalid or expired bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Token issuance failed
    #[error("Signing failure: {0}")]
    SigningFailure(String),
}

impl CacheError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            CacheError::ReadFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::SigningFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            CacheError::ReadFailure("eof".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CacheError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CacheError::NotFound("k".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::SigningFailure("json".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = CacheError::NotFound("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
