//! Runs a single task to completion under a deadline

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use log::warn;
use tokio::task::{JoinError, JoinHandle};

use crate::engine::config::ExecutionConfig;
use crate::engine::diagnostics::DiagnosticSink;
use crate::engine::error::TaskPanic;
use crate::engine::outcome::Outcome;
use crate::engine::task::TaskHandle;

/// Converts one task run into an `Outcome`.
///
/// Failures, panics and deadline expiry all come back as data; nothing a
/// task body does can make `execute` fail.
#[derive(Clone)]
pub struct TaskExecutor {
    deadline: Option<Duration>,
    debug: bool,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl TaskExecutor {
    #[must_use]
    pub fn new(config: &ExecutionConfig) -> Self {
        Self {
            deadline: config.deadline(),
            debug: config.debug,
            diagnostics: Arc::clone(&config.diagnostics),
        }
    }

    /// Run `task` on the ambient tokio scheduler.
    ///
    /// Must be awaited inside a tokio runtime. The deadline is enforced
    /// inside the spawned task, so the body is always polled before its own
    /// deadline is checked, even when the scheduler was idle in between.
    /// An expired body is dropped before `TimedOut` is reported, so no part
    /// of it is still running once the outcome is seen. Dropping the
    /// returned future aborts the task.
    pub async fn execute<T>(&self, task: TaskHandle<T>) -> Outcome<T>
    where
        T: Send + 'static,
    {
        let label = task.label().map(str::to_owned);
        let deadline = self.deadline;
        let mut running = AbortOnDrop(tokio::spawn(async move {
            match deadline {
                None => Ok(task.start().await),
                Some(limit) => tokio::time::timeout(limit, task.start())
                    .await
                    .map_err(|_| limit),
            }
        }));

        let outcome = match (&mut running.0).await {
            Ok(Ok(Ok(value))) => Outcome::Success(value),
            Ok(Ok(Err(error))) => Outcome::Failure(error),
            Ok(Err(limit)) => {
                warn!(
                    "Task {} timed out after {limit:?}",
                    display_label(label.as_deref())
                );
                return Outcome::TimedOut(limit);
            }
            Err(join_error) => Outcome::Failure(join_failure(join_error)),
        };

        if self.debug
            && let Outcome::Failure(error) = &outcome
        {
            self.diagnostics.task_failed(label.as_deref(), error);
        }

        outcome
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn join_failure(error: JoinError) -> anyhow::Error {
    if error.is_panic() {
        anyhow::Error::new(TaskPanic {
            message: panic_message(error.into_panic()),
        })
    } else {
        anyhow!("Task was cancelled by its scheduler before completing")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn display_label(label: Option<&str>) -> &str {
    label.unwrap_or("<unnamed>")
}
