//! Tests for metrics sinks

use std::time::Duration;

use prometheus_task_scheduler::core::{
    build_task_event, InMemoryMetricsSink, MetricsSink, TaskEventKind, TaskFailure, TaskId,
};

#[test]
fn test_in_memory_metrics_sink() {
    let sink = InMemoryMetricsSink::new(10);

    sink.record(build_task_event(
        &TaskId::new("task1"),
        "report",
        TaskEventKind::Started,
        1,
        None,
        None,
    ));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].task_id.as_str(), "task1");
    assert_eq!(events[0].name, "report");
    assert_eq!(events[0].kind, TaskEventKind::Started);
}

#[test]
fn test_metrics_sink_overflow() {
    let sink = InMemoryMetricsSink::new(2);

    for id in ["task1", "task2", "task3"] {
        sink.record(build_task_event(
            &TaskId::new(id),
            "job",
            TaskEventKind::Submitted,
            0,
            None,
            None,
        ));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].task_id.as_str(), "task2"); // First one popped
    assert_eq!(events[1].task_id.as_str(), "task3");
}

#[test]
fn test_clones_share_buffer() {
    let sink = InMemoryMetricsSink::new(10);
    let handle = sink.clone();
    sink.record(build_task_event(
        &TaskId::new("task1"),
        "job",
        TaskEventKind::Failed,
        2,
        Some(Duration::from_millis(40)),
        Some(TaskFailure::Timeout(Duration::from_millis(40))),
    ));

    let events = handle.events_for(&TaskId::new("task1"));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].duration, Some(Duration::from_millis(40)));
    assert!(events[0].error.as_ref().unwrap().is_timeout());
    assert!(events[0].at_ms > 0);
    assert!(handle.events_for(&TaskId::new("task2")).is_empty());
}
