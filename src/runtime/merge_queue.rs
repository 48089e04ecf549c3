//! Many-producer, single-consumer queue merging worker outcomes.
//!
//! Channel-based: producers push from any thread without blocking, and the
//! queue reports exhaustion once every producer has been dropped and all
//! buffered items have been taken.

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Producer half; one clone per worker group.
pub type MergeSender<T> = mpsc::UnboundedSender<T>;

/// Create a queue and its first producer handle.
#[must_use]
pub fn channel<T>() -> (MergeSender<T>, MergeQueue<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, MergeQueue::new(rx))
}

/// Consumer half of the merge queue.
///
/// Yields items in arrival order. Pushes from one producer stay in the
/// order they were made; pushes from different producers interleave freely.
pub struct MergeQueue<T> {
    inner: UnboundedReceiverStream<T>,
}

impl<T> MergeQueue<T> {
    #[inline]
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(rx),
        }
    }

    /// Stop accepting pushes. Buffered items can still be drained, and
    /// producers observe the closure through `MergeSender::closed`.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

impl<T> Stream for MergeQueue<T> {
    type Item = T;

    #[inline]
    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
