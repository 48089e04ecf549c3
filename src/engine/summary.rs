//! Per-run outcome counters

use std::fmt;
use std::time::{Duration, Instant};

use crate::engine::error::EngineError;
use crate::engine::outcome::Outcome;

/// Tally of what a run has yielded so far.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    started_at: Instant,
    finished_in: Option<Duration>,
}

impl RunSummary {
    pub(crate) fn new(submitted: usize) -> Self {
        Self {
            submitted,
            succeeded: 0,
            failed: 0,
            timed_out: 0,
            started_at: Instant::now(),
            finished_in: None,
        }
    }

    /// Freeze the elapsed time once the run is drained.
    pub(crate) fn finish(&mut self) {
        self.finished_in.get_or_insert_with(|| self.started_at.elapsed());
    }

    pub(crate) fn record<T>(&mut self, outcome: &Outcome<T>) {
        match outcome {
            Outcome::Success(_) => self.succeeded += 1,
            Outcome::Failure(_) => self.failed += 1,
            Outcome::TimedOut(_) => self.timed_out += 1,
        }
    }

    /// Count a failure or timeout that was raised instead of yielded.
    pub(crate) fn record_error(&mut self, error: &EngineError) {
        match error {
            EngineError::TaskFailed(_) => self.failed += 1,
            EngineError::TaskTimedOut(_) => self.timed_out += 1,
            _ => {}
        }
    }

    /// Number of outcomes recorded.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed + self.timed_out
    }

    /// Wall time of the run, or time so far if it is still going.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.finished_in.unwrap_or_else(|| self.started_at.elapsed())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} tasks completed in {:?} ({} ok, {} failed, {} timed out)",
            self.completed(),
            self.submitted,
            self.elapsed(),
            self.succeeded,
            self.failed,
            self.timed_out
        )
    }
}
