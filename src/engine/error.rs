//! Engine error types

use std::time::Duration;
use thiserror::Error;

/// Error types surfaced by the execution engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// A task body failed and `return_exceptions` is off.
    ///
    /// The original error is kept intact, so callers can recover it with
    /// `anyhow::Error::downcast_ref`.
    #[error("Task failed: {0:#}")]
    TaskFailed(anyhow::Error),

    /// A task exceeded its deadline and `return_exceptions` is off
    #[error("Task timed out after {0:?}")]
    TaskTimedOut(Duration),

    /// A cooperative scheduler could not be created
    #[error("Failed to build scheduler: {0}")]
    SchedulerBuild(#[source] std::io::Error),

    /// A worker thread could not be spawned
    #[error("Failed to spawn worker group {group}: {source}")]
    WorkerSpawn {
        group: usize,
        source: std::io::Error,
    },

    /// A worker group went away without reporting completion
    #[error("Worker group {0} terminated abnormally")]
    WorkerPanicked(usize),

    /// A blocking entry point was called from inside an async runtime
    #[error("Blocking run requested from within an async runtime; use the stream API instead")]
    NestedRuntime,
}

/// Failure recorded when a task body panics instead of returning.
///
/// Delivered inside `Outcome::Failure`; recover it with
/// `error.downcast_ref::<TaskPanic>()`.
#[derive(Debug, Error)]
#[error("Task panicked: {message}")]
pub struct TaskPanic {
    pub message: String,
}

/// Convenience result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// True for errors that originate in a task body rather than in the engine.
    #[must_use]
    pub fn is_task_error(&self) -> bool {
        matches!(self, Self::TaskFailed(_) | Self::TaskTimedOut(_))
    }
}
