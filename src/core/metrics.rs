//! Metrics sink implementations.
//!
//! The scheduler reports a start and an end event per execution attempt to
//! an optional [`MetricsSink`]. What the sink does with them is its own
//! business.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::task::TaskId;
use crate::core::TaskFailure;
use crate::util::clock::now_ms;

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEventKind {
    /// Accepted into the queue.
    Submitted,
    /// An attempt began executing.
    Started,
    /// An attempt succeeded; the task is terminal.
    Completed,
    /// An attempt failed and no retry follows; the task is terminal.
    Failed,
    /// An attempt failed and the task was re-enqueued.
    Retrying,
}

impl TaskEventKind {
    /// Whether this kind closes an attempt.
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Retrying)
    }
}

/// Metrics event structure.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    /// Related task identifier.
    pub task_id: TaskId,
    /// Task label.
    pub name: String,
    /// Event kind; end kinds carry the outcome.
    pub kind: TaskEventKind,
    /// Attempt number the event belongs to (0 before the first start).
    pub attempt: u32,
    /// Attempt duration, set on end events.
    pub duration: Option<Duration>,
    /// Failure, set on `Failed` and `Retrying`.
    pub error: Option<TaskFailure>,
    /// Timestamp milliseconds.
    pub at_ms: u128,
}

/// Metrics sink abstraction.
pub trait MetricsSink: Send + Sync {
    /// Record a task event.
    fn record(&self, event: TaskEvent);
}

/// In-memory sink for testing and dev.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone)]
pub struct InMemoryMetricsSink {
    events: Arc<Mutex<VecDeque<TaskEvent>>>,
    max_events: usize,
}

impl InMemoryMetricsSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events for one task, oldest first.
    #[must_use]
    pub fn events_for(&self, task_id: &TaskId) -> Vec<TaskEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| &event.task_id == task_id)
            .cloned()
            .collect()
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn record(&self, event: TaskEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Forwards events to `tracing` under the `task_metrics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&self, event: TaskEvent) {
        let duration_ms = event.duration.map(|d| d.as_millis());
        match &event.error {
            Some(error) => tracing::info!(
                target: "task_metrics",
                task_id = %event.task_id,
                name = %event.name,
                kind = ?event.kind,
                attempt = event.attempt,
                duration_ms = ?duration_ms,
                error = %error,
                "task event"
            ),
            None => tracing::info!(
                target: "task_metrics",
                task_id = %event.task_id,
                name = %event.name,
                kind = ?event.kind,
                attempt = event.attempt,
                duration_ms = ?duration_ms,
                "task event"
            ),
        }
    }
}

/// Helper to build a task event stamped with the current time.
pub fn build_task_event(
    task_id: &TaskId,
    name: impl Into<String>,
    kind: TaskEventKind,
    attempt: u32,
    duration: Option<Duration>,
    error: Option<TaskFailure>,
) -> TaskEvent {
    TaskEvent {
        task_id: task_id.clone(),
        name: name.into(),
        kind,
        attempt,
        duration,
        error,
        at_ms: now_ms(),
    }
}
