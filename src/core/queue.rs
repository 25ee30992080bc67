//! In-memory priority queue of pending task ids.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::task::{Priority, TaskId};

/// A pending entry: which task, at which class, in which submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTask {
    /// Task waiting to run.
    pub id: TaskId,
    /// Class it competes in.
    pub priority: Priority,
    /// Enqueue sequence number; lower means earlier.
    pub seq: u64,
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first
        match self.priority.cmp(&other.priority) {
            // FIFO within same priority: lower seq wins (reversed for max-heap)
            Ordering::Equal => other.seq.cmp(&self.seq),
            other => other,
        }
    }
}

/// Pending tasks ordered by priority class, then by enqueue order.
///
/// Uses a binary heap for O(log n) enqueue and dequeue. A sequence counter
/// rather than a wall-clock timestamp breaks ties, so two submissions in the
/// same millisecond still keep their order.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    tasks: BinaryHeap<QueuedTask>,
    next_seq: u64,
}

impl PriorityQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task behind every earlier entry of the same class.
    ///
    /// No duplicate detection is performed.
    pub fn enqueue(&mut self, id: TaskId, priority: Priority) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(QueuedTask { id, priority, seq });
    }

    /// Remove and return the front entry.
    pub fn dequeue(&mut self) -> Option<QueuedTask> {
        self.tasks.pop()
    }

    /// Current depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pending ids front-to-back, i.e. in the order `dequeue` would yield them.
    #[must_use]
    pub fn ids_in_order(&self) -> Vec<TaskId> {
        let mut entries: Vec<&QueuedTask> = self.tasks.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|entry| entry.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> TaskId {
        TaskId::new(format!("task-{n}"))
    }

    fn drain(q: &mut PriorityQueue) -> Vec<TaskId> {
        std::iter::from_fn(|| q.dequeue().map(|entry| entry.id)).collect()
    }

    #[test]
    fn test_priority_ordering() {
        let mut q = PriorityQueue::new();

        q.enqueue(id(1), Priority::Low);
        q.enqueue(id(2), Priority::Medium);
        q.enqueue(id(3), Priority::High);

        assert_eq!(drain(&mut q), vec![id(3), id(2), id(1)]);
    }

    #[test]
    fn test_fifo_within_priority() {
        let mut q = PriorityQueue::new();

        q.enqueue(id(1), Priority::Medium);
        q.enqueue(id(2), Priority::High);
        q.enqueue(id(3), Priority::Medium);
        q.enqueue(id(4), Priority::High);
        q.enqueue(id(5), Priority::Medium);

        assert_eq!(drain(&mut q), vec![id(2), id(4), id(1), id(3), id(5)]);
    }

    #[test]
    fn test_reenqueue_joins_back_of_class() {
        let mut q = PriorityQueue::new();
        q.enqueue(id(1), Priority::High);
        q.enqueue(id(2), Priority::Low);

        let retried = q.dequeue().unwrap();
        assert_eq!(retried.id, id(1));
        q.enqueue(id(3), Priority::High);
        q.enqueue(retried.id, Priority::High);

        assert_eq!(drain(&mut q), vec![id(3), id(1), id(2)]);
    }

    #[test]
    fn test_duplicates_are_independent_entries() {
        let mut q = PriorityQueue::new();
        q.enqueue(id(1), Priority::Low);
        q.enqueue(id(1), Priority::Low);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_ids_in_order_matches_dequeue_order() {
        let mut q = PriorityQueue::new();
        q.enqueue(id(1), Priority::Low);
        q.enqueue(id(2), Priority::High);
        q.enqueue(id(3), Priority::Medium);
        q.enqueue(id(4), Priority::High);

        let listed = q.ids_in_order();
        assert_eq!(q.len(), 4);
        assert_eq!(listed, drain(&mut q));
    }

    #[test]
    fn test_empty_queue() {
        let mut q = PriorityQueue::new();
        assert!(q.dequeue().is_none());
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
    }
}
