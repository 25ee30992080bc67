//! Error types for scheduler operations and task failures.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::task::TaskId;

/// Errors produced by the scheduler's own bookkeeping.
///
/// These surface synchronously from `submit`, queries, and construction.
/// Failures of submitted work are never reported here; they are recorded on
/// the task as a [`TaskFailure`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A priority label could not be parsed.
    #[error("invalid priority: {0}")]
    InvalidPriority(String),
    /// A task timeout of zero was requested.
    #[error("invalid timeout: task timeout must be greater than 0")]
    InvalidTimeout,
    /// Pool configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No task with this id is tracked.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The id generator produced an id that is already tracked.
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(TaskId),
    /// The scheduler no longer admits submissions.
    #[error("scheduler has been shut down")]
    Shutdown,
    /// No async runtime was available to bind to.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Why a task attempt (or a whole task) ended in `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFailure {
    /// The unit of work returned an error.
    #[error("{0}")]
    Application(String),
    /// The unit of work did not settle within its bound.
    #[error("task timeout exceeded after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The unit of work panicked.
    #[error("unit of work panicked: {0}")]
    Panicked(String),
    /// The unit of work was dropped before reporting an outcome.
    #[error("unit of work was dropped before reporting an outcome")]
    Aborted,
    /// Every permitted attempt failed.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Executions attempted in total.
        attempts: u32,
        /// Failure of the final attempt.
        last: Box<TaskFailure>,
    },
}

impl TaskFailure {
    /// Whether the (final) failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::RetriesExhausted { last, .. } => last.is_timeout(),
            _ => false,
        }
    }

    /// The failure of the last attempt, unwrapping retry exhaustion.
    #[must_use]
    pub fn last_attempt(&self) -> &Self {
        match self {
            Self::RetriesExhausted { last, .. } => last.last_attempt(),
            other => other,
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
///
/// Units of work return this; the error chain is flattened into
/// [`TaskFailure::Application`] when recorded.
pub type AppResult<T> = Result<T, anyhow::Error>;
