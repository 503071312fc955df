//! Telemetry Module
//!
//! Request instrumentation: byte counting, timing and access records.

mod access_log;
mod body;
mod middleware;

pub use access_log::{AccessLog, AccessRecord, MemoryAccessLog, TracingAccessLog, ACCESS_TARGET};
pub use body::CountingBody;
pub use middleware::instrument;
