//! Builder assembling a [`TaskScheduler`] from configuration and collaborators.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::PoolConfig;
use crate::core::{
    MetricsSink, SchedulerError, Spawn, TaskIdGenerator, TaskScheduler, UuidTaskIds,
};
use crate::runtime::TokioSpawner;

/// Collects configuration and collaborators, then builds a scheduler.
///
/// ```rust,ignore
/// let scheduler = SchedulerBuilder::<String, _>::new(PoolConfig::from_env()?, TokioSpawner::current()?)
///     .with_metrics(Arc::new(TracingMetricsSink))
///     .build()?;
/// ```
pub struct SchedulerBuilder<T, S> {
    config: PoolConfig,
    spawner: S,
    ids: Option<Box<dyn TaskIdGenerator>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    _result_marker: PhantomData<fn() -> T>,
}

impl<T, S> SchedulerBuilder<T, S>
where
    T: Clone + Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Start from a configuration and a spawner.
    pub fn new(config: PoolConfig, spawner: S) -> Self {
        Self {
            config,
            spawner,
            ids: None,
            metrics: None,
            _result_marker: PhantomData,
        }
    }

    /// Configuration that will be validated at build time.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Use a custom task id generator instead of random UUIDs.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl TaskIdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    /// Report task events to `sink`.
    #[must_use]
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Validate the configuration and build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is invalid.
    pub fn build(self) -> Result<TaskScheduler<T, S>, SchedulerError> {
        let ids = self.ids.unwrap_or_else(|| Box::new(UuidTaskIds));
        TaskScheduler::from_parts(self.config, self.spawner, ids, self.metrics)
    }
}

impl<T> SchedulerBuilder<T, TokioSpawner>
where
    T: Clone + Send + 'static,
{
    /// Start from a configuration, binding to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Runtime` when called outside a Tokio runtime.
    pub fn on_current_runtime(config: PoolConfig) -> Result<Self, SchedulerError> {
        Ok(Self::new(config, TokioSpawner::current()?))
    }
}
