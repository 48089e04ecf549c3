//! Configuration for a run

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::diagnostics::{DiagnosticSink, LogSink};
use crate::runtime::SchedulerContext;

/// Configuration shared by every runner in a run.
///
/// Cloned into each task executor and worker group; cloning is cheap
/// (the sink and scheduler are behind `Arc`).
#[derive(Clone)]
pub struct ExecutionConfig {
    /// Per-task deadline; `Duration::ZERO` means unbounded
    pub timeout: Duration,
    /// Yield failures and timeouts as data instead of raising them
    pub return_exceptions: bool,
    /// Report failures to the diagnostic sink
    pub debug: bool,
    /// Upper bound on worker groups in threaded mode
    pub max_groups: usize,
    /// Caller-owned scheduler reused by single-group runs
    pub scheduler: Option<SchedulerContext>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            return_exceptions: true,
            debug: false,
            max_groups: 4,
            scheduler: None,
            diagnostics: Arc::new(LogSink),
        }
    }
}

impl ExecutionConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ExecutionConfigBuilder {
        ExecutionConfigBuilder::new()
    }

    /// The per-task deadline, or `None` when unbounded.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }

    /// Configured group count, never below one.
    #[must_use]
    pub fn group_limit(&self) -> usize {
        self.max_groups.max(1)
    }
}

impl fmt::Debug for ExecutionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionConfig")
            .field("timeout", &self.timeout)
            .field("return_exceptions", &self.return_exceptions)
            .field("debug", &self.debug)
            .field("max_groups", &self.max_groups)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

/// Builder for `ExecutionConfig`
pub struct ExecutionConfigBuilder {
    config: ExecutionConfig,
}

impl ExecutionConfigBuilder {
    /// Create a builder seeded with the defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ExecutionConfig::default(),
        }
    }

    /// Set the per-task deadline (`Duration::ZERO` disables it)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the per-task deadline in seconds.
    ///
    /// Zero, negative and non-finite values leave the deadline unbounded.
    #[must_use]
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.config.timeout = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
        self
    }

    #[must_use]
    pub fn return_exceptions(mut self, enabled: bool) -> Self {
        self.config.return_exceptions = enabled;
        self
    }

    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Set the worker group bound; zero is treated as one
    #[must_use]
    pub fn max_groups(mut self, groups: usize) -> Self {
        self.config.max_groups = groups.max(1);
        self
    }

    /// Reuse a caller-owned scheduler for single-group runs
    #[must_use]
    pub fn scheduler(mut self, context: SchedulerContext) -> Self {
        self.config.scheduler = Some(context);
        self
    }

    /// Replace the diagnostic sink used when `debug` is on
    #[must_use]
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.config.diagnostics = Arc::new(sink);
        self
    }

    #[must_use]
    pub fn build(self) -> ExecutionConfig {
        self.config
    }
}

impl Default for ExecutionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
