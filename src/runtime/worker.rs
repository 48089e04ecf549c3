//! Dedicated OS threads hosting one worker group each

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;

/// Handle to a worker thread.
///
/// Resolves with the worker's return value once its closure has finished,
/// or with `RecvError` if the thread died before reporting.
pub(crate) struct WorkerHandle<R> {
    group: usize,
    done: oneshot::Receiver<R>,
    thread: Option<JoinHandle<()>>,
}

impl<R> WorkerHandle<R>
where
    R: Send + 'static,
{
    /// Spawn `work` on a named thread for `group`.
    pub(crate) fn spawn<F>(group: usize, work: F) -> io::Result<Self>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let thread = thread::Builder::new()
            .name(format!("coroflow-group-{group}"))
            .spawn(move || {
                let _ = tx.send(work());
            })?;

        Ok(Self {
            group,
            done: rx,
            thread: Some(thread),
        })
    }
}

impl<R> WorkerHandle<R> {
    pub(crate) fn group(&self) -> usize {
        self.group
    }

    /// Reap the thread after it reported; returns at once since the
    /// closure has already returned.
    fn reap(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl<R> Future for WorkerHandle<R> {
    type Output = Result<R, oneshot::error::RecvError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let report = match Pin::new(&mut self.done).poll(cx) {
            Poll::Ready(report) => report,
            Poll::Pending => return Poll::Pending,
        };
        self.reap();
        Poll::Ready(report)
    }
}
