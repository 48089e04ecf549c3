//! Completion-ordered execution on one cooperative scheduler

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, Stream, StreamExt};
use log::{debug, info};

use crate::engine::config::ExecutionConfig;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::executor::TaskExecutor;
use crate::engine::outcome::Outcome;
use crate::engine::summary::RunSummary;
use crate::engine::task::TaskHandle;
use crate::runtime::Scheduler;

/// Runs a batch of tasks concurrently on a single scheduler.
#[derive(Debug, Clone, Default)]
pub struct SingleGroupRunner {
    config: ExecutionConfig,
}

impl SingleGroupRunner {
    #[must_use]
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Stream outcomes on the ambient tokio runtime.
    ///
    /// Tasks start on the first poll; the stream must be polled inside a
    /// tokio runtime. The configured scheduler context is not consulted.
    pub fn stream<T, I>(&self, tasks: I) -> CompletionStream<T>
    where
        T: Send + 'static,
        I: IntoIterator<Item = TaskHandle<T>>,
    {
        CompletionStream::new(tasks, &self.config)
    }

    /// Iterate outcomes from synchronous code.
    ///
    /// Uses the configured scheduler context if there is one, otherwise a
    /// private single-threaded runtime that is shut down once the iterator
    /// is drained or dropped. Tasks only make progress while `next` is
    /// being called.
    pub fn run<T, I>(&self, tasks: I) -> EngineResult<Outcomes<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = TaskHandle<T>>,
    {
        let scheduler = Scheduler::acquire(self.config.scheduler.as_ref())?;

        Ok(Outcomes {
            stream: self.stream(tasks),
            scheduler: Some(scheduler),
        })
    }
}

/// Outcomes of one group, in the order their tasks finished.
///
/// Finite and single-pass. With `return_exceptions` off, the first failure
/// or timeout is yielded as an error, the remaining tasks are cancelled and
/// the stream ends.
pub struct CompletionStream<T> {
    pending: FuturesUnordered<BoxFuture<'static, Outcome<T>>>,
    return_exceptions: bool,
    summary: RunSummary,
    finished: bool,
    group: Option<usize>,
}

impl<T> CompletionStream<T>
where
    T: Send + 'static,
{
    pub fn new<I>(tasks: I, config: &ExecutionConfig) -> Self
    where
        I: IntoIterator<Item = TaskHandle<T>>,
    {
        let executor = TaskExecutor::new(config);
        let pending: FuturesUnordered<_> = tasks
            .into_iter()
            .map(|task| {
                let executor = executor.clone();
                async move { executor.execute(task).await }.boxed()
            })
            .collect();

        Self {
            summary: RunSummary::new(pending.len()),
            pending,
            return_exceptions: config.return_exceptions,
            finished: false,
            group: None,
        }
    }
}

impl<T> CompletionStream<T> {
    /// Mark this stream as one worker group of a larger run; its summary is
    /// then logged at debug level only.
    pub(crate) fn within_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    /// Tasks that have not produced an outcome yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Stop early, cancelling every task still running.
    pub fn cancel(&mut self) {
        if !self.pending.is_empty() {
            debug!("Cancelling {} pending tasks", self.pending.len());
        }
        self.pending = FuturesUnordered::new();
        self.finished = true;
    }

    fn raise(&mut self, error: EngineError) -> EngineResult<Outcome<T>> {
        self.cancel();
        Err(error)
    }
}

impl<T> Stream for CompletionStream<T> {
    type Item = EngineResult<Outcome<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let outcome = match self.pending.poll_next_unpin(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Some(outcome)) => outcome,
            Poll::Ready(None) => {
                self.finished = true;
                self.summary.finish();
                match self.group {
                    Some(group) => debug!("Worker group {group} drained: {}", self.summary),
                    None => info!("Run finished: {}", self.summary),
                }
                return Poll::Ready(None);
            }
        };

        self.summary.record(&outcome);

        let item = match outcome {
            Outcome::Failure(error) if !self.return_exceptions => {
                self.raise(EngineError::TaskFailed(error))
            }
            Outcome::TimedOut(limit) if !self.return_exceptions => {
                self.raise(EngineError::TaskTimedOut(limit))
            }
            outcome => Ok(outcome),
        };

        Poll::Ready(Some(item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, Some(self.pending.len()))
        }
    }
}

/// Blocking iterator over a single-group run.
///
/// Each call to `next` drives the scheduler until one more task finishes.
pub struct Outcomes<T> {
    // Dropped before the scheduler so pending tasks are aborted first
    stream: CompletionStream<T>,
    scheduler: Option<Scheduler>,
}

impl<T> Outcomes<T> {
    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        self.stream.summary()
    }

    fn release(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            debug!("Releasing scheduler ({})", scheduler_kind(&scheduler));
        }
    }
}

impl<T> Iterator for Outcomes<T> {
    type Item = EngineResult<Outcome<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let scheduler = self.scheduler.as_ref()?;
        let item = scheduler.block_on(self.stream.next());

        if self.stream.is_finished() {
            self.release();
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

fn scheduler_kind(scheduler: &Scheduler) -> &'static str {
    match scheduler {
        Scheduler::Owned(_) => "owned",
        Scheduler::Shared(_) => "shared",
    }
}
