//! `coroflow` - concurrent task execution with completion-ordered results
//!
//! Submit a batch of async tasks and consume their outcomes as each one
//! finishes rather than in submission order. Tasks run either on a single
//! cooperative scheduler or partitioned across worker threads, each thread
//! with a private scheduler, with outcomes merged into one stream.

// Module declarations
pub mod engine;
pub mod runtime;

// Re-export runtime types
pub use runtime::{MergeQueue, SchedulerContext};

// Re-export engine types
pub use engine::{
    CompletionStream, DiagnosticSink, EngineError, EngineResult, ExecutionConfig,
    ExecutionConfigBuilder, LogSink, MergedIter, MergedOutcomes, Outcome, Outcomes, RunSummary,
    SingleGroupRunner, TaskExecutor, TaskHandle, TaskPanic, ThreadedRunner, partition,
    partition_sizes,
};

// Re-export entry points
pub use engine::{run_coros, stream_coros, threading_run_coros};
