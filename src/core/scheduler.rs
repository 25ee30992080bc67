//! Task scheduler: priority queue, dispatch loop, and public API.
//!
//! Dispatch is event-driven. The loop runs on two triggers, a submission and
//! the end of an attempt, and each run dispatches while a worker slot is free
//! and the queue is non-empty. It never waits for the work it dispatches.
//!
//! Shared state (queue, registry, running list, counters) lives behind one
//! `parking_lot::Mutex` that is never held across an await. Capacity is
//! reserved through the [`ConcurrencyLimiter`] CAS before anything is
//! dequeued, so at most `max_workers` tasks are ever `running`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::core::executor::{run_with_timeout, Spawn};
use crate::core::ids::{TaskIdGenerator, UuidTaskIds};
use crate::core::limiter::{ConcurrencyLimiter, WorkerPermit};
use crate::core::metrics::{build_task_event, MetricsSink, TaskEventKind};
use crate::core::queue::PriorityQueue;
use crate::core::retry::{RetryDecision, RetryPolicy};
use crate::core::task::{SubmitOptions, TaskId, TaskRecord, TaskSnapshot, UnitOfWork};
use crate::core::{SchedulerError, TaskFailure};
use crate::runtime::TokioSpawner;
use crate::util::clock::now_ms;

/// Counters describing scheduler load and history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Tasks waiting in the queue.
    pub pending_count: usize,
    /// Tasks currently executing.
    pub running_count: usize,
    /// Configured advisory warm capacity.
    pub configured_min_workers: u32,
    /// Configured concurrency ceiling.
    pub configured_max_workers: u32,
    /// Tasks accepted by `submit`.
    pub submitted_count: u64,
    /// Tasks that reached `completed`.
    pub completed_count: u64,
    /// Tasks that reached terminal `failed`.
    pub failed_count: u64,
    /// Re-enqueues performed by the retry policy.
    pub retried_count: u64,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: u64,
    completed: u64,
    failed: u64,
    retried: u64,
}

struct SchedulerState<T>
where
    T: Send + 'static,
{
    queue: PriorityQueue,
    tasks: HashMap<TaskId, TaskRecord<T>>,
    /// Running ids in dispatch order.
    running: Vec<TaskId>,
    counters: Counters,
}

/// Everything the executor needs for one attempt, captured at dispatch.
struct Dispatch<T>
where
    T: Send + 'static,
{
    id: TaskId,
    name: String,
    attempt: u32,
    timeout: Duration,
    work: Arc<dyn UnitOfWork<T>>,
}

/// How an attempt left the task.
enum Settled {
    Completed,
    Retrying(TaskFailure),
    Failed(TaskFailure),
}

impl<T> SchedulerState<T>
where
    T: Send + 'static,
{
    fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            tasks: HashMap::new(),
            running: Vec::new(),
            counters: Counters::default(),
        }
    }

    /// `pending -> running` for the dequeued id.
    fn begin(&mut self, id: &TaskId) -> Option<Dispatch<T>> {
        let record = self.tasks.get_mut(id)?;
        record.mark_running(now_ms());
        self.running.push(id.clone());
        Some(Dispatch {
            id: id.clone(),
            name: record.name.clone(),
            attempt: record.attempt_count,
            timeout: record.timeout,
            work: Arc::clone(&record.work),
        })
    }

    /// Record the outcome of an attempt and consult the retry policy.
    fn settle(
        &mut self,
        id: &TaskId,
        outcome: Result<T, TaskFailure>,
        policy: RetryPolicy,
    ) -> Option<Settled> {
        self.running.retain(|running| running != id);
        let record = self.tasks.get_mut(id)?;
        let now = now_ms();

        let failure = match outcome {
            Ok(value) => {
                record.complete(value, now);
                self.counters.completed += 1;
                return Some(Settled::Completed);
            }
            Err(failure) => failure,
        };

        record.fail(failure.clone(), now);
        match policy.decide(record.attempt_count) {
            RetryDecision::Retry { priority } => {
                record.reset_for_retry(priority);
                self.queue.enqueue(id.clone(), priority);
                self.counters.retried += 1;
                Some(Settled::Retrying(failure))
            }
            RetryDecision::GiveUp => {
                let terminal = policy.exhausted(record.attempt_count, failure);
                record.error = Some(terminal.clone());
                self.counters.failed += 1;
                Some(Settled::Failed(terminal))
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.running.is_empty()
    }
}

struct Inner<T, S>
where
    T: Send + 'static,
{
    config: PoolConfig,
    limiter: ConcurrencyLimiter,
    retry: RetryPolicy,
    state: Mutex<SchedulerState<T>>,
    ids: Box<dyn TaskIdGenerator>,
    metrics: Option<Arc<dyn MetricsSink>>,
    spawner: S,
    /// Signaled after every settled attempt.
    changed: Notify,
    shutdown: AtomicBool,
}

/// Priority-ordered task scheduler with a bounded worker pool.
///
/// Cloning yields another handle to the same scheduler. There is no global
/// instance: construct one and pass it to whoever submits work.
///
/// ```rust,ignore
/// let scheduler = TaskScheduler::<String>::new(PoolConfig::new().with_max_workers(4))?;
/// let id = scheduler.submit(
///     "render-report",
///     || async { Ok(render().await?) },
///     SubmitOptions::new().with_priority(Priority::High),
/// )?;
/// let done = scheduler.await_terminal(&id).await?;
/// ```
pub struct TaskScheduler<T, S = TokioSpawner>
where
    T: Send + 'static,
{
    inner: Arc<Inner<T, S>>,
}

impl<T, S> Clone for TaskScheduler<T, S>
where
    T: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> TaskScheduler<T, TokioSpawner>
where
    T: Clone + Send + 'static,
{
    /// Create a scheduler bound to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::InvalidConfig` if the configuration is invalid
    /// - `SchedulerError::Runtime` if called outside a Tokio runtime
    pub fn new(config: PoolConfig) -> Result<Self, SchedulerError> {
        Self::from_parts(config, TokioSpawner::current()?, Box::new(UuidTaskIds), None)
    }
}

impl<T, S> TaskScheduler<T, S>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Assemble a scheduler from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is invalid.
    pub fn from_parts(
        config: PoolConfig,
        spawner: S,
        ids: Box<dyn TaskIdGenerator>,
        metrics: Option<Arc<dyn MetricsSink>>,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        info!(
            min_workers = config.min_workers,
            max_workers = config.max_workers,
            task_timeout_ms = config.task_timeout_ms,
            retry_attempts = config.retry_attempts,
            "task scheduler initialized (bounded pool, min_workers is advisory)"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                limiter: ConcurrencyLimiter::new(config.min_workers, config.max_workers),
                retry: RetryPolicy::new(config.retry_attempts),
                state: Mutex::new(SchedulerState::new()),
                ids,
                metrics,
                spawner,
                changed: Notify::new(),
                shutdown: AtomicBool::new(false),
                config,
            }),
        })
    }

    /// Enqueue a unit of work and return its id immediately.
    ///
    /// The work runs later, when a worker slot is free and nothing ahead of
    /// it is queued. Its outcome is only observable through queries.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::Shutdown` after [`TaskScheduler::shutdown`]
    /// - `SchedulerError::InvalidTimeout` for a zero timeout
    /// - `SchedulerError::DuplicateTaskId` if the id generator repeated an id
    ///   that is still tracked (see [`TaskIdGenerator`] for cleared ids)
    pub fn submit<W>(
        &self,
        name: impl Into<String>,
        work: W,
        options: SubmitOptions,
    ) -> Result<TaskId, SchedulerError>
    where
        W: UnitOfWork<T> + 'static,
    {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::Shutdown);
        }
        let timeout = options
            .timeout
            .unwrap_or_else(|| self.inner.config.task_timeout());
        if timeout.is_zero() {
            return Err(SchedulerError::InvalidTimeout);
        }
        let priority = options.priority.unwrap_or_default();
        let name = name.into();
        let id = self.inner.ids.next_id();

        {
            let mut state = self.inner.state.lock();
            if state.tasks.contains_key(&id) {
                return Err(SchedulerError::DuplicateTaskId(id));
            }
            let record = TaskRecord::new(
                id.clone(),
                name.clone(),
                priority,
                timeout,
                Arc::new(work),
                now_ms(),
            );
            state.tasks.insert(id.clone(), record);
            state.queue.enqueue(id.clone(), priority);
            state.counters.submitted += 1;
        }

        info!(task_id = %id, name = %name, %priority, "task added to queue");
        self.inner
            .emit(&id, &name, TaskEventKind::Submitted, 0, None, None);

        self.inner.dispatch();
        Ok(id)
    }

    /// Current view of one task.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::TaskNotFound` for unknown or cleared ids.
    pub fn get_status(&self, id: &TaskId) -> Result<TaskSnapshot<T>, SchedulerError> {
        self.inner
            .state
            .lock()
            .tasks
            .get(id)
            .map(TaskRecord::snapshot)
            .ok_or_else(|| SchedulerError::TaskNotFound(id.clone()))
    }

    /// Running tasks in dispatch order, then pending tasks in queue order.
    ///
    /// Terminal tasks are not listed; query them with `get_status`.
    #[must_use]
    pub fn list_tasks(&self) -> Vec<TaskSnapshot<T>> {
        let state = self.inner.state.lock();
        state
            .running
            .iter()
            .cloned()
            .chain(state.queue.ids_in_order())
            .filter_map(|id| state.tasks.get(&id).map(TaskRecord::snapshot))
            .collect()
    }

    /// Load and history counters.
    #[must_use]
    pub fn get_stats(&self) -> SchedulerStats {
        let state = self.inner.state.lock();
        SchedulerStats {
            pending_count: state.queue.len(),
            running_count: state.running.len(),
            configured_min_workers: self.inner.config.min_workers,
            configured_max_workers: self.inner.config.max_workers,
            submitted_count: state.counters.submitted,
            completed_count: state.counters.completed,
            failed_count: state.counters.failed,
            retried_count: state.counters.retried,
        }
    }

    /// Drop every terminal record and return how many were removed.
    ///
    /// Pending and running tasks are untouched. Records are otherwise kept
    /// indefinitely. Removed ids are forgotten entirely, so uniqueness past
    /// this point rests on the [`TaskIdGenerator`].
    pub fn clear_completed(&self) -> usize {
        let removed = {
            let mut state = self.inner.state.lock();
            let before = state.tasks.len();
            state.tasks.retain(|_, record| !record.is_terminal());
            before - state.tasks.len()
        };
        if removed > 0 {
            info!(removed, "cleared terminal tasks");
        }
        removed
    }

    /// Wait until the task is `completed` or terminally `failed`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::TaskNotFound` for unknown ids, or if the
    /// record is cleared while waiting.
    pub async fn await_terminal(&self, id: &TaskId) -> Result<TaskSnapshot<T>, SchedulerError> {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let snapshot = self.get_status(id)?;
            if snapshot.is_terminal() {
                return Ok(snapshot);
            }
            notified.await;
        }
    }

    /// Wait until the queue is empty and nothing is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.state.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Stop admitting submissions. Queued and running work drains normally.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.swap(true, Ordering::AcqRel) {
            info!("task scheduler shutting down, no further submissions accepted");
        }
    }

    /// Whether [`TaskScheduler::shutdown`] was called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Configuration the scheduler was built with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }
}

impl<T, S> Inner<T, S>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Dispatch while capacity is free and work is queued.
    fn dispatch(self: &Arc<Self>) {
        loop {
            let Some(permit) = self.limiter.try_acquire() else {
                debug!("all workers busy, leaving remaining tasks queued");
                break;
            };

            let job = {
                let mut state = self.state.lock();
                let Some(entry) = state.queue.dequeue() else {
                    break;
                };
                match state.begin(&entry.id) {
                    Some(job) => job,
                    None => {
                        warn!(task_id = %entry.id, "dequeued task has no record, skipping");
                        continue;
                    }
                }
            };

            debug!(
                task_id = %job.id,
                name = %job.name,
                attempt = job.attempt,
                "executing task"
            );
            self.spawner.spawn(Arc::clone(self).execute(permit, job));
        }
    }

    /// Run one attempt, settle it, release the slot, and pull more work.
    async fn execute(self: Arc<Self>, permit: WorkerPermit, job: Dispatch<T>) {
        let Dispatch {
            id,
            name,
            attempt,
            timeout,
            work,
        } = job;

        self.emit(&id, &name, TaskEventKind::Started, attempt, None, None);
        let started = Instant::now();
        let outcome = run_with_timeout(&self.spawner, work, timeout).await;
        let elapsed = started.elapsed();

        let settled = self.state.lock().settle(&id, outcome, self.retry);
        match settled {
            Some(Settled::Completed) => {
                info!(task_id = %id, name = %name, attempt, elapsed_ms = elapsed.as_millis(), "task completed");
                self.emit(&id, &name, TaskEventKind::Completed, attempt, Some(elapsed), None);
            }
            Some(Settled::Retrying(failure)) => {
                warn!(task_id = %id, name = %name, attempt, error = %failure, "task failed, retrying at high priority");
                self.emit(&id, &name, TaskEventKind::Retrying, attempt, Some(elapsed), Some(failure));
            }
            Some(Settled::Failed(failure)) => {
                error!(task_id = %id, name = %name, attempt, error = %failure, "task failed");
                self.emit(&id, &name, TaskEventKind::Failed, attempt, Some(elapsed), Some(failure));
            }
            None => warn!(task_id = %id, "finished task has no record"),
        }

        drop(permit);
        self.changed.notify_waiters();
        self.dispatch();
    }
}

impl<T, S> Inner<T, S>
where
    T: Send + 'static,
{
    fn emit(
        &self,
        id: &TaskId,
        name: &str,
        kind: TaskEventKind,
        attempt: u32,
        duration: Option<Duration>,
        error: Option<TaskFailure>,
    ) {
        if let Some(sink) = &self.metrics {
            sink.record(build_task_event(id, name, kind, attempt, duration, error));
        }
    }
}
