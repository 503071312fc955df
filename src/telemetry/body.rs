//! Counting Body
//!
//! Body decorator that forwards every frame unchanged while tallying the
//! data bytes that pass through it.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Bytes, HttpBody};
use http_body::{Frame, SizeHint};

// == Counting Body ==
/// Wraps a body and adds the length of each data frame to a shared counter.
///
/// Counting is lazy: only bytes actually polled out of the body are counted,
/// regardless of any declared length. An optional guard is dropped as soon as
/// the inner body reports end of stream, or when the body itself is dropped.
pub struct CountingBody<B> {
    inner: B,
    counter: Arc<AtomicU64>,
    guard: Option<Box<dyn Send + 'static>>,
}

impl<B> CountingBody<B> {
    /// Wraps `inner`, counting into `counter`.
    pub fn new(inner: B, counter: Arc<AtomicU64>) -> Self {
        Self {
            inner,
            counter,
            guard: None,
        }
    }

    /// Attaches a value whose `Drop` runs once the body is finished.
    pub fn on_finish<G: Send + 'static>(mut self, guard: G) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }
}

impl<B> HttpBody for CountingBody<B>
where
    B: HttpBody<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.counter.fetch_add(data.len() as u64, Ordering::Relaxed);
                }
            }
            Poll::Ready(None) => {
                this.guard.take();
            }
            _ => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
