//! # Prometheus Task Scheduler
//!
//! An in-process asynchronous task scheduler: a priority-ordered work queue
//! executed by a bounded pool of concurrent workers, with per-task timeouts
//! and a bounded retry/escalation policy.
//!
//! ## Key Features
//!
//! - **Priority Classes**: `high` before `medium` before `low`, FIFO within a class
//! - **Bounded Concurrency**: at most `max_workers` tasks run at once
//! - **Timeouts Without Cancellation**: the scheduler stops waiting after the
//!   task's timeout; the work itself is left to finish in the background
//! - **Retry Escalation**: failed tasks are re-enqueued at `high` priority up
//!   to `retry_attempts` times
//! - **Fire-and-Forget Submission**: `submit` returns an id at once; outcomes
//!   are observed through `get_status`, `await_terminal`, or a metrics sink
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prometheus_task_scheduler::config::PoolConfig;
//! use prometheus_task_scheduler::core::{Priority, SubmitOptions, TaskScheduler};
//! use std::time::Duration;
//!
//! let scheduler = TaskScheduler::<u64>::new(
//!     PoolConfig::new()
//!         .with_max_workers(4)
//!         .with_task_timeout(Duration::from_secs(10))
//!         .with_retry_attempts(2),
//! )?;
//!
//! let id = scheduler.submit(
//!     "count-documents",
//!     || async { Ok(count_documents().await?) },
//!     SubmitOptions::new().with_priority(Priority::High),
//! )?;
//!
//! let snapshot = scheduler.await_terminal(&id).await?;
//! println!("{:?} after {} attempt(s)", snapshot.status, snapshot.attempt_count);
//! ```
//!
//! Timed-out work may keep consuming resources until it finishes on its own.
//! Units of work that hold scarce resources should bound themselves.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and capacity accounting.
pub mod core;
/// Configuration models for the worker pool.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
