//! Instrumentation Middleware
//!
//! Outermost stage of the request pipeline. Measures bytes in, bytes out,
//! status and time for every request, including ones rejected further in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode, Version},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::access_log::{AccessLog, AccessRecord};
use super::body::CountingBody;

/// Instruments one request.
///
/// The request body is wrapped so bytes are counted as handlers drain it.
/// Status and elapsed time are captured when the inner pipeline returns;
/// the record itself is written once the response body has been sent (or
/// abandoned), so the byte count for the response is final.
pub async fn instrument(
    State(log): State<Arc<dyn AccessLog>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().to_string();
    let version = request.version();

    let bytes_read = Arc::new(AtomicU64::new(0));
    let request = request.map(|body| Body::new(CountingBody::new(body, bytes_read.clone())));

    let response = next.run(request).await;

    let bytes_written = Arc::new(AtomicU64::new(0));
    let pending = PendingRecord {
        method,
        path,
        version,
        status: response.status(),
        elapsed: started.elapsed(),
        bytes_read,
        bytes_written: bytes_written.clone(),
        log,
    };

    response.map(|body| Body::new(CountingBody::new(body, bytes_written).on_finish(pending)))
}

// == Pending Record ==
/// Everything known about a request except the final byte counts, which
/// are read when this value is dropped.
struct PendingRecord {
    method: Method,
    path: String,
    version: Version,
    status: StatusCode,
    elapsed: Duration,
    bytes_read: Arc<AtomicU64>,
    bytes_written: Arc<AtomicU64>,
    log: Arc<dyn AccessLog>,
}

impl Drop for PendingRecord {
    fn drop(&mut self) {
        let record = AccessRecord {
            method: self.method.clone(),
            path: std::mem::take(&mut self.path),
            version: self.version,
            status: self.status,
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            elapsed: self.elapsed,
        };

        if let Err(e) = self.log.record(&record) {
            debug!("Dropped access record: {}", e);
        }
    }
}
