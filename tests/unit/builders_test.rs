//! Tests for builder modules

use prometheus_task_scheduler::builders::SchedulerBuilder;
use prometheus_task_scheduler::config::PoolConfig;
use prometheus_task_scheduler::core::{SchedulerError, TaskScheduler};
use prometheus_task_scheduler::runtime::TokioSpawner;

#[test]
fn test_builder_keeps_config() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let builder = SchedulerBuilder::<(), _>::new(
        PoolConfig::new().with_max_workers(3),
        TokioSpawner::new(rt.handle().clone()),
    );
    assert_eq!(builder.config().max_workers, 3);

    let scheduler = builder.build().unwrap();
    assert_eq!(scheduler.config().max_workers, 3);
    assert_eq!(scheduler.get_stats().configured_max_workers, 3);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let result = SchedulerBuilder::<(), _>::new(
        PoolConfig::new().with_min_workers(0).with_max_workers(0),
        TokioSpawner::new(rt.handle().clone()),
    )
    .build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_scheduler_requires_runtime() {
    let result = TaskScheduler::<()>::new(PoolConfig::default());
    assert!(matches!(result, Err(SchedulerError::Runtime(_))));
    assert!(SchedulerBuilder::<(), TokioSpawner>::on_current_runtime(PoolConfig::default()).is_err());
}
