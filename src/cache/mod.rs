//! Cache Module
//!
//! Provides the in-memory value store and the content entities it holds.

mod content;
mod store;


// Re-export public types
pub use content::{content_types_from, Content};
pub use store::{KeyValueStore, LockedStore, ShardedStore};
