//! Multi-group execution: one thread and one scheduler per partition

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{FutureExt, Stream, StreamExt};
use log::{debug, info, warn};

use crate::engine::config::ExecutionConfig;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::outcome::Outcome;
use crate::engine::partition::{Partition, partition};
use crate::engine::single::CompletionStream;
use crate::engine::summary::RunSummary;
use crate::engine::task::TaskHandle;
use crate::runtime::merge_queue::{self, MergeQueue, MergeSender};
use crate::runtime::{WorkerHandle, build_local_runtime};

type Item<T> = EngineResult<Outcome<T>>;

/// Spreads a batch across worker groups, each on its own OS thread with a
/// private single-threaded scheduler, and merges their outcomes.
#[derive(Debug, Clone, Default)]
pub struct ThreadedRunner {
    config: ExecutionConfig,
}

impl ThreadedRunner {
    #[must_use]
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Start every group and return the merged outcome stream.
    ///
    /// Groups never share a scheduler, so the configured scheduler context
    /// is not used here. If a worker thread cannot be spawned, the groups
    /// already started are told to stop and the spawn error is returned.
    pub fn run<T, I>(&self, tasks: I) -> EngineResult<MergedOutcomes<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = TaskHandle<T>>,
    {
        let partitions = partition(tasks.into_iter().collect(), self.config.group_limit());
        let submitted = partitions.iter().map(Vec::len).sum();
        let (tx, queue) = merge_queue::channel();

        let mut workers = Vec::with_capacity(partitions.len());
        for (group, tasks) in partitions.into_iter().enumerate() {
            let tx = tx.clone();
            let config = self.config.clone();

            debug!("Starting worker group {group} with {} tasks", tasks.len());
            let worker = WorkerHandle::spawn(group, move || run_group(group, tasks, &config, tx))
                .map_err(|source| EngineError::WorkerSpawn { group, source })?;
            workers.push(worker);
        }

        Ok(MergedOutcomes {
            queue,
            workers,
            summary: RunSummary::new(submitted),
            state: MergeState::Streaming,
        })
    }
}

/// Body of one worker thread. Returns how many outcomes it delivered.
fn run_group<T>(
    group: usize,
    tasks: Partition<TaskHandle<T>>,
    config: &ExecutionConfig,
    tx: MergeSender<Item<T>>,
) -> usize
where
    T: Send + 'static,
{
    let runtime = match build_local_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = tx.send(Err(e));
            return 0;
        }
    };

    let delivered = runtime.block_on(async {
        let mut stream = CompletionStream::new(tasks, config).within_group(group);
        let mut delivered = 0;

        loop {
            tokio::select! {
                item = stream.next() => match item {
                    Some(item) => {
                        if tx.send(item).is_err() {
                            break;
                        }
                        delivered += 1;
                    }
                    None => break,
                },
                () = tx.closed() => {
                    debug!(
                        "Worker group {group} stopping, consumer went away with {} tasks pending",
                        stream.remaining()
                    );
                    break;
                }
            }
        }

        delivered
    });

    drop(runtime);
    debug!("Worker group {group} finished after delivering {delivered} outcomes");
    delivered
}

enum MergeState {
    Streaming,
    Joining,
    Done,
}

/// Outcomes merged from every worker group.
///
/// Within one group outcomes keep their completion order; across groups
/// they arrive in whatever order the threads produce them. Implements
/// `Stream` for async consumers; `into_iter` gives a blocking iterator
/// for synchronous ones.
///
/// An error item ends the stream and stops the remaining groups. Dropping
/// the stream early does the same.
pub struct MergedOutcomes<T> {
    queue: MergeQueue<Item<T>>,
    workers: Vec<WorkerHandle<usize>>,
    summary: RunSummary,
    state: MergeState,
}

impl<T> MergedOutcomes<T> {
    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Number of worker groups not yet reaped.
    #[must_use]
    pub fn active_groups(&self) -> usize {
        self.workers.len()
    }

    fn abort(&mut self) {
        self.queue.close();
        self.workers.clear();
        self.state = MergeState::Done;
    }
}

impl<T> Stream for MergedOutcomes<T> {
    type Item = Item<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            match this.state {
                MergeState::Streaming => match this.queue.poll_next_unpin(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Some(Ok(outcome))) => {
                        this.summary.record(&outcome);
                        return Poll::Ready(Some(Ok(outcome)));
                    }
                    Poll::Ready(Some(Err(e))) => {
                        this.summary.record_error(&e);
                        this.abort();
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Ready(None) => this.state = MergeState::Joining,
                },
                MergeState::Joining => {
                    while let Some(worker) = this.workers.last_mut() {
                        let group = worker.group();
                        match worker.poll_unpin(cx) {
                            Poll::Pending => return Poll::Pending,
                            Poll::Ready(Ok(_)) => {
                                this.workers.pop();
                            }
                            Poll::Ready(Err(_)) => {
                                warn!("Worker group {group} exited without reporting");
                                this.abort();
                                return Poll::Ready(Some(Err(EngineError::WorkerPanicked(group))));
                            }
                        }
                    }
                    this.summary.finish();
                    info!("Threaded run finished: {}", this.summary);
                    this.state = MergeState::Done;
                }
                MergeState::Done => return Poll::Ready(None),
            }
        }
    }
}

impl<T> IntoIterator for MergedOutcomes<T> {
    type Item = Item<T>;
    type IntoIter = MergedIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        MergedIter { inner: self }
    }
}

/// Blocking iterator over a threaded run.
///
/// Parks the calling thread until the next outcome arrives; do not use it
/// from inside an async task.
pub struct MergedIter<T> {
    inner: MergedOutcomes<T>,
}

impl<T> MergedIter<T> {
    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        self.inner.summary()
    }
}

impl<T> Iterator for MergedIter<T> {
    type Item = Item<T>;

    fn next(&mut self) -> Option<Self::Item> {
        futures::executor::block_on(self.inner.next())
    }
}
