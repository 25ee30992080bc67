//! Tests for error types

use std::time::Duration;

use prometheus_task_scheduler::core::{SchedulerError, TaskFailure, TaskId};

#[test]
fn test_invalid_priority_error() {
    let err = SchedulerError::InvalidPriority("urgent".to_string());
    assert_eq!(format!("{}", err), "invalid priority: urgent");
}

#[test]
fn test_task_not_found_error() {
    let err = SchedulerError::TaskNotFound(TaskId::new("task_1"));
    assert_eq!(format!("{}", err), "task not found: task_1");
}

#[test]
fn test_shutdown_error() {
    let err = SchedulerError::Shutdown;
    assert_eq!(format!("{}", err), "scheduler has been shut down");
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("max_workers must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: max_workers must be greater than 0"
    );
}

#[test]
fn test_failure_messages() {
    assert_eq!(
        TaskFailure::Application("boom".into()).to_string(),
        "boom"
    );
    assert_eq!(
        TaskFailure::Timeout(Duration::from_millis(50)).to_string(),
        "task timeout exceeded after 50ms"
    );
    assert_eq!(
        TaskFailure::RetriesExhausted {
            attempts: 3,
            last: Box::new(TaskFailure::Application("boom".into())),
        }
        .to_string(),
        "retries exhausted after 3 attempts: boom"
    );
}

#[test]
fn test_failure_serializes() {
    let json = serde_json::to_value(TaskFailure::Panicked("oops".into())).unwrap();
    assert_eq!(json, serde_json::json!({ "panicked": "oops" }));
}
