//! Content Module
//!
//! The stored value: content-type descriptors plus an opaque payload, and the
//! codec that moves it between HTTP bodies and the store.

use axum::{
    body::{self, Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue},
    response::Response,
};

use crate::error::{CacheError, Result};

// == Content ==
/// One stored value. Immutable once constructed.
///
/// Descriptors are kept as the raw header values that arrived, so bytes
/// outside UTF-8 are replayed exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    content_types: Vec<HeaderValue>,
    payload: Bytes,
}

impl Content {
    // == Constructor ==
    /// Creates a new Content from descriptors and payload.
    pub fn new(content_types: Vec<HeaderValue>, payload: impl Into<Bytes>) -> Self {
        Self {
            content_types,
            payload: payload.into(),
        }
    }

    /// Content-type descriptors in the order they were received.
    pub fn content_types(&self) -> &[HeaderValue] {
        &self.content_types
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    // == Decode ==
    /// Builds a Content by draining `body` completely.
    ///
    /// Any error from the underlying stream, including a client that
    /// disconnects mid-upload, is returned as [`CacheError::ReadFailure`].
    pub async fn read_from(content_types: Vec<HeaderValue>, body: Body) -> Result<Self> {
        let payload = body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| CacheError::ReadFailure(e.to_string()))?;

        Ok(Self::new(content_types, payload))
    }

    // == Encode ==
    /// Renders the stored value as a response: one `Content-Type` header per
    /// descriptor, in order, followed by the payload verbatim.
    pub fn to_response(&self) -> Response {
        let mut response = Response::new(Body::from(self.payload.clone()));
        let headers = response.headers_mut();

        for content_type in &self.content_types {
            headers.append(CONTENT_TYPE, content_type.clone());
        }

        response
    }
}

// == Header Extraction ==
/// Collects every `Content-Type` header value from a request, preserving
/// order and duplicates.
pub fn content_types_from(headers: &HeaderMap) -> Vec<HeaderValue> {
    headers.get_all(CONTENT_TYPE).iter().cloned().collect()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::HttpBody;
    use http_body::Frame;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Yields one chunk and then fails, like a connection reset mid-upload.
    struct BrokenBody {
        sent: bool,
    }

    impl HttpBody for BrokenBody {
        type Data = Bytes;
        type Error = io::Error;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<std::result::Result<Frame<Bytes>, io::Error>>> {
            if self.sent {
                return Poll::Ready(Some(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                ))));
            }
            self.sent = true;
            Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"partial")))))
        }
    }

    #[test]
    fn test_read_from_drains_body() {
        let content = tokio_test::block_on(Content::read_from(
            vec![HeaderValue::from_static("text/plain")],
            Body::from("world"),
        ))
        .unwrap();

        assert_eq!(content.content_types(), ["text/plain"]);
        assert_eq!(content.payload().as_ref(), b"world");
    }

    #[test]
    fn test_read_from_empty_body() {
        let content = tokio_test::block_on(Content::read_from(Vec::new(), Body::empty())).unwrap();

        assert!(content.content_types().is_empty());
        assert!(content.payload().is_empty());
    }

    #[test]
    fn test_read_from_stream_error() {
        let result = tokio_test::block_on(Content::read_from(
            Vec::new(),
            Body::new(BrokenBody { sent: false }),
        ));

        assert!(matches!(result, Err(CacheError::ReadFailure(_))));
    }

    #[tokio::test]
    async fn test_to_response_replays_headers_in_order() {
        let content = Content::new(
            vec![
                HeaderValue::from_static("text/plain"),
                HeaderValue::from_static("application/json"),
                HeaderValue::from_static("text/plain"),
            ],
            Bytes::from_static(b"\x00\xffraw"),
        );

        let response = content.to_response();
        let types: Vec<&str> = response
            .headers()
            .get_all(CONTENT_TYPE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(types, ["text/plain", "application/json", "text/plain"]);

        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), b"\x00\xffraw");
    }

    #[test]
    fn test_to_response_without_types_sets_no_content_type() {
        let response = Content::new(Vec::new(), "abc").to_response();
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_content_types_from_keeps_duplicates() {
        let mut headers = HeaderMap::new();
        headers.append(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.append(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.append(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        assert_eq!(
            content_types_from(&headers),
            ["text/plain", "text/html", "text/plain"]
        );
    }

    #[test]
    fn test_non_utf8_content_type_replays_byte_for_byte() {
        let raw: &[u8] = b"text/plain; charset=caf\xe9";
        let mut headers = HeaderMap::new();
        headers.append(CONTENT_TYPE, HeaderValue::from_bytes(raw).unwrap());

        let content = Content::new(content_types_from(&headers), "abc");
        let response = content.to_response();

        let replayed: Vec<&[u8]> = response
            .headers()
            .get_all(CONTENT_TYPE)
            .iter()
            .map(|v| v.as_bytes())
            .collect();
        assert_eq!(replayed, [raw]);
    }
}
