//! Uniform result of running one task

use std::time::Duration;

use crate::engine::error::{EngineError, EngineResult};

/// The tagged result of running one task.
///
/// Exactly one variant is produced per submitted task, whether the body
/// returned, failed, panicked or ran past its deadline.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The body returned normally
    Success(T),
    /// The body returned an error or panicked
    Failure(anyhow::Error),
    /// The deadline elapsed first; carries the configured limit
    TimedOut(Duration),
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// Borrow the success value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the captured failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Consume the outcome, keeping only a success value.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Transform the success value, leaving failures and timeouts untouched.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
            Self::TimedOut(limit) => Outcome::TimedOut(limit),
        }
    }

    /// Convert into a `Result`, raising failures and timeouts as task errors.
    pub fn into_result(self) -> EngineResult<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(EngineError::TaskFailed(error)),
            Self::TimedOut(limit) => Err(EngineError::TaskTimedOut(limit)),
        }
    }
}
