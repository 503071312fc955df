//! API Module
//!
//! HTTP handlers and routing for the cache server.
//!
//! # Endpoints
//! - `GET /` - List all keys
//! - `GET /:key` - Fetch stored content
//! - `PUT /:key` - Store content (bearer token required)
//! - `DELETE /:key` - Delete a key (bearer token required)

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
