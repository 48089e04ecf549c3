//! Diagnostic sink for failed tasks

use log::error;

/// Receives failures when `debug` is enabled.
///
/// Called before the failure is handed to the consumer. Implementations
/// observe only; they cannot alter the outcome.
pub trait DiagnosticSink: Send + Sync {
    fn task_failed(&self, label: Option<&str>, error: &anyhow::Error);
}

/// Default sink writing through the `log` facade.
///
/// The `Debug` form of `anyhow::Error` carries the cause chain and, when
/// `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` is set, the captured backtrace.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn task_failed(&self, label: Option<&str>, error: &anyhow::Error) {
        error!("Task {} failed: {error:?}", label.unwrap_or("<unnamed>"));
    }
}
