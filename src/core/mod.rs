//! Core scheduling abstractions and capacity accounting.

pub mod error;
pub mod executor;
pub mod ids;
pub mod limiter;
pub mod metrics;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod task;

pub use error::{AppResult, SchedulerError, TaskFailure};
pub use executor::{run_with_timeout, Spawn};
pub use ids::{SequentialTaskIds, TaskIdGenerator, UuidTaskIds};
pub use limiter::{ConcurrencyLimiter, WorkerPermit};
pub use metrics::{
    build_task_event, InMemoryMetricsSink, MetricsSink, TaskEvent, TaskEventKind,
    TracingMetricsSink,
};
pub use queue::{PriorityQueue, QueuedTask};
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::{SchedulerStats, TaskScheduler};
pub use task::{Priority, SubmitOptions, TaskId, TaskSnapshot, TaskStatus, UnitOfWork};
