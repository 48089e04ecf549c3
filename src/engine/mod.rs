//! Task execution engine
//!
//! Wraps tasks with deadlines, runs them on one cooperative scheduler or
//! across worker groups, and streams their outcomes in completion order.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod partition;
pub mod single;
pub mod summary;
pub mod task;
pub mod threaded;

mod convenience;

// Re-export core types
pub use config::{ExecutionConfig, ExecutionConfigBuilder};
pub use diagnostics::{DiagnosticSink, LogSink};
pub use error::{EngineError, EngineResult, TaskPanic};
pub use executor::TaskExecutor;
pub use outcome::Outcome;
pub use partition::{Partition, partition, partition_sizes};
pub use single::{CompletionStream, Outcomes, SingleGroupRunner};
pub use summary::RunSummary;
pub use task::TaskHandle;
pub use threaded::{MergedIter, MergedOutcomes, ThreadedRunner};

// Re-export entry points
pub use convenience::{run_coros, stream_coros, threading_run_coros};
