//! Runtime module
//!
//! Scheduler ownership, worker threads and the cross-thread merge queue.

pub mod merge_queue;
pub mod scheduler;
pub(crate) mod worker;

pub use merge_queue::{MergeQueue, MergeSender};
pub use scheduler::SchedulerContext;

pub(crate) use scheduler::{Scheduler, build_local_runtime};
pub(crate) use worker::WorkerHandle;
