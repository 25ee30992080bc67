//! Task records, priorities, and the unit-of-work abstraction.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, SchedulerError, TaskFailure};

/// Opaque unique task identifier, assigned at submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap an already-unique identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Priority class governing dequeue order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Routine background work.
    Low,
    /// Default class.
    #[default]
    Medium,
    /// Urgent work; retried tasks are escalated here.
    High,
}

impl Priority {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(SchedulerError::InvalidPriority(s.to_string())),
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting in the priority queue.
    Pending,
    /// Dispatched and holding a worker slot.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error and no retry pending.
    Failed,
}

/// An opaque, re-invocable asynchronous operation supplied by a caller.
///
/// The scheduler has no knowledge of what the work does. It may be invoked
/// more than once when the task is retried.
///
/// Any `Fn() -> impl Future<Output = AppResult<T>>` closure is a unit of work:
///
/// ```rust,ignore
/// scheduler.submit("resize", || async { Ok(resize_images().await?) }, SubmitOptions::default())?;
/// ```
#[async_trait]
pub trait UnitOfWork<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Run one attempt.
    async fn run(&self) -> AppResult<T>;
}

#[async_trait]
impl<T, F, Fut> UnitOfWork<T> for F
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    async fn run(&self) -> AppResult<T> {
        (self)().await
    }
}

/// Per-submission options; unset fields fall back to pool defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Priority class, `medium` if unset.
    pub priority: Option<Priority>,
    /// Execution bound, the pool's `task_timeout_ms` if unset.
    pub timeout: Option<Duration>,
}

impl SubmitOptions {
    /// Options with every field unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            priority: None,
            timeout: None,
        }
    }

    /// Set the priority class.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the execution timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The tracked unit of submitted work and its lifecycle state.
pub(crate) struct TaskRecord<T>
where
    T: Send + 'static,
{
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) priority: Priority,
    pub(crate) submitted_priority: Priority,
    pub(crate) work: Arc<dyn UnitOfWork<T>>,
    pub(crate) created_at_ms: u128,
    pub(crate) started_at_ms: Option<u128>,
    pub(crate) completed_at_ms: Option<u128>,
    pub(crate) status: TaskStatus,
    pub(crate) result: Option<T>,
    pub(crate) error: Option<TaskFailure>,
    pub(crate) timeout: Duration,
    pub(crate) attempt_count: u32,
}

impl<T> TaskRecord<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(
        id: TaskId,
        name: String,
        priority: Priority,
        timeout: Duration,
        work: Arc<dyn UnitOfWork<T>>,
        now_ms: u128,
    ) -> Self {
        Self {
            id,
            name,
            priority,
            submitted_priority: priority,
            work,
            created_at_ms: now_ms,
            started_at_ms: None,
            completed_at_ms: None,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            timeout,
            attempt_count: 0,
        }
    }

    /// `pending -> running`; counts the attempt.
    pub(crate) fn mark_running(&mut self, now_ms: u128) {
        self.status = TaskStatus::Running;
        self.started_at_ms = Some(now_ms);
        self.attempt_count += 1;
    }

    /// `running -> completed`.
    pub(crate) fn complete(&mut self, result: T, now_ms: u128) {
        self.status = TaskStatus::Completed;
        self.completed_at_ms = Some(now_ms);
        self.result = Some(result);
        self.error = None;
    }

    /// `running -> failed`.
    pub(crate) fn fail(&mut self, failure: TaskFailure, now_ms: u128) {
        self.status = TaskStatus::Failed;
        self.completed_at_ms = Some(now_ms);
        self.result = None;
        self.error = Some(failure);
    }

    /// `failed -> pending` at the given (escalated) priority.
    pub(crate) fn reset_for_retry(&mut self, priority: Priority) {
        self.status = TaskStatus::Pending;
        self.priority = priority;
        self.started_at_ms = None;
        self.completed_at_ms = None;
        self.result = None;
        self.error = None;
    }

    pub(crate) const fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl<T> TaskRecord<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn snapshot(&self) -> TaskSnapshot<T> {
        TaskSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            priority: self.priority,
            submitted_priority: self.submitted_priority,
            status: self.status,
            created_at_ms: self.created_at_ms,
            started_at_ms: self.started_at_ms,
            completed_at_ms: self.completed_at_ms,
            result: self.result.clone(),
            error: self.error.clone(),
            timeout: self.timeout,
            attempt_count: self.attempt_count,
        }
    }
}

/// Point-in-time view of a task, as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot<T> {
    /// Task identifier.
    pub id: TaskId,
    /// Caller-supplied label, not unique.
    pub name: String,
    /// Current priority class (escalated to `high` after a retry).
    pub priority: Priority,
    /// Priority class requested at submission.
    pub submitted_priority: Priority,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Submission time, milliseconds since epoch.
    pub created_at_ms: u128,
    /// Start of the current attempt.
    pub started_at_ms: Option<u128>,
    /// End of the current attempt.
    pub completed_at_ms: Option<u128>,
    /// Output of a completed task.
    pub result: Option<T>,
    /// Failure of a failed task.
    pub error: Option<TaskFailure>,
    /// Execution bound per attempt.
    pub timeout: Duration,
    /// Executions started so far.
    pub attempt_count: u32,
}

impl<T> TaskSnapshot<T> {
    /// Whether no further transitions will occur.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }
}
