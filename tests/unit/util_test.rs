//! Tests for utility functions

use prometheus_task_scheduler::core::{Priority, SubmitOptions, TaskId};
use prometheus_task_scheduler::util::{init_tracing, now_ms};
use std::time::Duration;

#[test]
fn test_priority_ordering() {
    assert!(Priority::High > Priority::Medium);
    assert!(Priority::Medium > Priority::Low);
    assert_eq!(Priority::High.to_string(), "high");
}

#[test]
fn test_clock_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_submit_options() {
    let options = SubmitOptions::new()
        .with_priority(Priority::Low)
        .with_timeout(Duration::from_millis(50));
    assert_eq!(options.priority, Some(Priority::Low));
    assert_eq!(options.timeout, Some(Duration::from_millis(50)));
    assert_eq!(SubmitOptions::default(), SubmitOptions::new());
}

#[test]
fn test_task_id() {
    let id = TaskId::new("task_12345");
    assert_eq!(id.as_str(), "task_12345");
    assert_eq!(id.to_string(), "task_12345");
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
