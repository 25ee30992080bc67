//! Task identity generators.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::task::TaskId;

/// Source of task identifiers.
///
/// Implementations must never return the same id twice over the lifetime of
/// a scheduler. The scheduler only rejects ids it still tracks, so an id
/// handed out again after `clear_completed` evicted its record is accepted
/// and aliases the old task for anyone still holding it.
pub trait TaskIdGenerator: Send + Sync {
    /// Produce the next identifier.
    fn next_id(&self) -> TaskId;
}

/// Random `task_<uuid>` identifiers (the default).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTaskIds;

impl TaskIdGenerator for UuidTaskIds {
    fn next_id(&self) -> TaskId {
        TaskId::new(format!("task_{}", uuid::Uuid::new_v4().simple()))
    }
}

/// Deterministic `<prefix>-<n>` identifiers backed by an atomic counter.
#[derive(Debug)]
pub struct SequentialTaskIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialTaskIds {
    /// Start counting from 1 under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(1),
        }
    }
}

impl TaskIdGenerator for SequentialTaskIds {
    fn next_id(&self) -> TaskId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        TaskId::new(format!("{}-{n}", self.prefix))
    }
}
