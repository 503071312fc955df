//! Access Log Module
//!
//! The per-request record emitted by the instrumentation stage and the sinks
//! it can be written to.

use std::time::Duration;

use axum::http::{Method, StatusCode, Version};
use parking_lot::Mutex;
use tracing::info;

/// Tracing target for access records.
pub const ACCESS_TARGET: &str = "kvcache::access";

// == Access Record ==
/// One completed request as seen by the instrumentation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub method: Method,
    /// Request target, including any query string
    pub path: String,
    pub version: Version,
    pub status: StatusCode,
    /// Request body bytes actually consumed downstream
    pub bytes_read: u64,
    /// Response body bytes handed to the connection
    pub bytes_written: u64,
    /// Time spent inside the wrapped pipeline
    pub elapsed: Duration,
}

// == Access Log ==
/// Destination for access records.
///
/// Errors are reported to the caller for diagnostics only; the pipeline never
/// lets a failed write affect a response.
pub trait AccessLog: Send + Sync {
    fn record(&self, record: &AccessRecord) -> anyhow::Result<()>;
}

/// Writes each record as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAccessLog;

impl AccessLog for TracingAccessLog {
    fn record(&self, record: &AccessRecord) -> anyhow::Result<()> {
        info!(
            target: ACCESS_TARGET,
            method = %record.method,
            path = %record.path,
            version = ?record.version,
            status = record.status.as_u16(),
            bytes_read = record.bytes_read,
            bytes_written = record.bytes_written,
            elapsed_ms = record.elapsed.as_secs_f64() * 1000.0,
            "{} {} {:?} {} {} {} {:?}",
            record.method,
            record.path,
            record.version,
            record.status.as_u16(),
            record.bytes_read,
            record.bytes_written,
            record.elapsed,
        );
        Ok(())
    }
}

/// Keeps records in memory, in completion order.
#[derive(Debug, Default)]
pub struct MemoryAccessLog {
    records: Mutex<Vec<AccessRecord>>,
}

impl MemoryAccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record received so far.
    pub fn records(&self) -> Vec<AccessRecord> {
        self.records.lock().clone()
    }
}

impl AccessLog for MemoryAccessLog {
    fn record(&self, record: &AccessRecord) -> anyhow::Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
