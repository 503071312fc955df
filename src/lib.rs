//! KV Cache - An in-memory content cache server
//!
//! Stores opaque payloads with their content types under string keys, behind
//! stateless bearer-token authentication and per-request instrumentation.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod telemetry;

pub use api::{create_router, AppState};
pub use config::Config;
