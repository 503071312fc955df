//! API Routes
//!
//! Configures the Axum router and the middleware pipeline around it.

use axum::{middleware, routing::get, Router};

use super::handlers::{delete_handler, get_handler, list_handler, put_handler, AppState};
use crate::auth::authenticate;
use crate::telemetry::instrument;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - List all keys, one per line
/// - `GET /:key` - Fetch stored content
/// - `PUT /:key` - Store the request body under a key
/// - `DELETE /:key` - Delete a key
///
/// # Middleware
/// Outermost first: instrumentation, then authentication, then dispatch.
pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.authenticator.clone(), authenticate);
    let instrumentation = middleware::from_fn_with_state(state.access_log.clone(), instrument);

    // The last layer added wraps everything before it
    Router::new()
        .route("/", get(list_handler))
        .route(
            "/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .layer(auth)
        .layer(instrumentation)
        .with_state(state)
}
