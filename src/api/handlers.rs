//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use tracing::debug;

use crate::auth::Authenticator;
use crate::cache::{content_types_from, Content, KeyValueStore, ShardedStore};
use crate::error::{CacheError, Result};
use crate::telemetry::{AccessLog, TracingAccessLog};

/// Application state shared across all handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide value store
    pub store: Arc<dyn KeyValueStore>,
    /// Token issuance and validation
    pub authenticator: Authenticator,
    /// Destination for access records
    pub access_log: Arc<dyn AccessLog>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        authenticator: Authenticator,
        access_log: Arc<dyn AccessLog>,
    ) -> Self {
        Self {
            store,
            authenticator,
            access_log,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses the sharded store and writes access records through `tracing`.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            Arc::new(ShardedStore::new()),
            Authenticator::new(config.auth_secret.clone()),
            Arc::new(TracingAccessLog),
        )
    }
}

/// Handler for GET /
///
/// Lists every key, one per line.
pub async fn list_handler(State(state): State<AppState>) -> String {
    let mut body = String::new();
    for key in state.store.list() {
        body.push_str(&key);
        body.push('\n');
    }
    body
}

/// Handler for GET /:key
///
/// Replays the stored content types and payload.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    match state.store.get(&key) {
        Some(content) => Ok(content.to_response()),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /:key
///
/// Drains the request body and stores it with the request's content types.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<()> {
    let content = Content::read_from(content_types_from(&headers), body).await?;
    debug!("Storing {} bytes under {:?}", content.payload().len(), key);
    state.store.put(key, content);
    Ok(())
}

/// Handler for DELETE /:key
///
/// Removes the key; absent keys are not an error.
pub async fn delete_handler(State(state): State<AppState>, Path(key): Path<String>) {
    state.store.delete(&key);
}
