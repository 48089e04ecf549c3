//! Convenience entry points mirroring the two execution topologies

use crate::engine::config::ExecutionConfig;
use crate::engine::error::EngineResult;
use crate::engine::single::{CompletionStream, Outcomes, SingleGroupRunner};
use crate::engine::task::TaskHandle;
use crate::engine::threaded::{MergedOutcomes, ThreadedRunner};

/// Run tasks concurrently on one scheduler, yielding outcomes as they finish.
///
/// Blocking: call from synchronous code. The run uses `config.scheduler`
/// when set and otherwise owns a private runtime for its duration.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use coroflow::{ExecutionConfig, Outcome, TaskHandle, run_coros};
///
/// fn main() -> anyhow::Result<()> {
///     let tasks = vec![
///         TaskHandle::new(|| async {
///             tokio::time::sleep(Duration::from_millis(300)).await;
///             Ok("slow")
///         }),
///         TaskHandle::new(|| async { Ok("fast") }),
///     ];
///
///     for item in run_coros(tasks, ExecutionConfig::default())? {
///         if let Outcome::Success(value) = item? {
///             println!("{value}");
///         }
///     }
///     Ok(())
/// }
/// ```
pub fn run_coros<T, I>(tasks: I, config: ExecutionConfig) -> EngineResult<Outcomes<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = TaskHandle<T>>,
{
    SingleGroupRunner::new(config).run(tasks)
}

/// Async counterpart of `run_coros` that runs on the caller's tokio runtime.
pub fn stream_coros<T, I>(tasks: I, config: ExecutionConfig) -> CompletionStream<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = TaskHandle<T>>,
{
    SingleGroupRunner::new(config).stream(tasks)
}

/// Run tasks across up to `config.max_groups` worker threads.
///
/// The returned stream can be consumed with `StreamExt::next` from async
/// code or turned into a blocking iterator with `into_iter`.
///
/// # Example
///
/// ```rust,no_run
/// use coroflow::{ExecutionConfig, TaskHandle, threading_run_coros};
///
/// fn main() -> anyhow::Result<()> {
///     let tasks: Vec<_> = (0..6u32)
///         .map(|n| TaskHandle::new(move || async move { Ok(n * n) }))
///         .collect();
///     let config = ExecutionConfig::builder().max_groups(2).build();
///
///     for item in threading_run_coros(tasks, config)? {
///         println!("{:?}", item?);
///     }
///     Ok(())
/// }
/// ```
pub fn threading_run_coros<T, I>(tasks: I, config: ExecutionConfig) -> EngineResult<MergedOutcomes<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = TaskHandle<T>>,
{
    ThreadedRunner::new(config).run(tasks)
}
