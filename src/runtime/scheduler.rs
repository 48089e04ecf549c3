//! Cooperative scheduler ownership
//!
//! Every group runs on a single-threaded tokio runtime. A run either owns
//! that runtime for its lifetime or borrows one the caller keeps alive.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::engine::error::{EngineError, EngineResult};

/// Caller-owned scheduler shared with the engine.
///
/// The engine only clones the `Arc`; it never shuts the runtime down.
/// Cloning is cheap (Arc clone).
#[derive(Clone, Debug)]
pub struct SchedulerContext {
    runtime: Arc<Runtime>,
}

impl SchedulerContext {
    /// Take ownership of an existing runtime.
    #[must_use]
    pub fn new(runtime: Runtime) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }

    /// Convenience: build a fresh single-threaded runtime for the caller to own
    pub fn current_thread() -> EngineResult<Self> {
        build_local_runtime().map(Self::new)
    }

    #[must_use]
    pub fn handle(&self) -> &Handle {
        self.runtime.handle()
    }

    /// Drive `future` to completion on this runtime from synchronous code.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl From<Arc<Runtime>> for SchedulerContext {
    fn from(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }
}

/// The scheduler a blocking run drives its tasks on.
#[derive(Debug)]
pub(crate) enum Scheduler {
    /// Created for this run; shut down when dropped
    Owned(Runtime),
    /// Borrowed from the caller; left running
    Shared(SchedulerContext),
}

impl Scheduler {
    /// Reuse `context` if given, otherwise create a private runtime.
    ///
    /// Refuses to run inside an async context, where blocking on a
    /// runtime would panic.
    pub(crate) fn acquire(context: Option<&SchedulerContext>) -> EngineResult<Self> {
        if Handle::try_current().is_ok() {
            return Err(EngineError::NestedRuntime);
        }

        match context {
            Some(context) => Ok(Self::Shared(context.clone())),
            None => build_local_runtime().map(Self::Owned),
        }
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match self {
            Self::Owned(runtime) => runtime.block_on(future),
            Self::Shared(context) => context.block_on(future),
        }
    }
}

/// Build the single-threaded runtime one group runs on.
pub(crate) fn build_local_runtime() -> EngineResult<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(EngineError::SchedulerBuild)
}
