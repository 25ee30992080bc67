//! Worker pool configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable prefix read by [`PoolConfig::from_env`].
pub const ENV_PREFIX: &str = "TASK_POOL_";

/// Pool configuration, set once at scheduler construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Advisory warm capacity; reported, not enforced as a floor.
    pub min_workers: u32,
    /// Maximum tasks running simultaneously.
    pub max_workers: u32,
    /// Default per-task timeout in milliseconds.
    pub task_timeout_ms: u64,
    /// Re-executions allowed after a failed first attempt.
    pub retry_attempts: u32,
    /// Idle worker timeout in milliseconds. Declared only; the pool never
    /// shrinks.
    pub worker_idle_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_workers: 2,
            max_workers: 10,
            task_timeout_ms: 30_000,
            retry_attempts: 3,
            worker_idle_timeout_ms: 300_000,
        }
    }
}

impl PoolConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advisory warm capacity.
    #[must_use]
    pub const fn with_min_workers(mut self, min_workers: u32) -> Self {
        self.min_workers = min_workers;
        self
    }

    /// Set the concurrency ceiling.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: u32) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the default per-task timeout.
    #[must_use]
    pub const fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Set the retry bound.
    #[must_use]
    pub const fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// Set the (inert) idle worker timeout.
    #[must_use]
    pub const fn with_worker_idle_timeout(mut self, timeout: Duration) -> Self {
        self.worker_idle_timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Default per-task timeout.
    #[must_use]
    pub const fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }

    /// Idle worker timeout.
    #[must_use]
    pub const fn worker_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.worker_idle_timeout_ms)
    }

    /// Validate pool configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.min_workers > self.max_workers {
            return Err(format!(
                "min_workers ({}) must not exceed max_workers ({})",
                self.min_workers, self.max_workers
            ));
        }
        if self.task_timeout_ms == 0 {
            return Err("task_timeout_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse pool configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read `TASK_POOL_*` variables, loading a `.env` file first if present.
    ///
    /// Recognized: `TASK_POOL_MIN_WORKERS`, `TASK_POOL_MAX_WORKERS`,
    /// `TASK_POOL_TASK_TIMEOUT_MS`, `TASK_POOL_RETRY_ATTEMPTS`,
    /// `TASK_POOL_WORKER_IDLE_TIMEOUT_MS`. Unset variables keep defaults.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or the
    /// validation failure.
    pub fn from_env() -> Result<Self, String> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(format!("failed to load .env: {err}"));
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup using the `TASK_POOL_*` names.
    ///
    /// # Errors
    ///
    /// Same as [`PoolConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            min_workers: read_var(&lookup, "MIN_WORKERS", defaults.min_workers)?,
            max_workers: read_var(&lookup, "MAX_WORKERS", defaults.max_workers)?,
            task_timeout_ms: read_var(&lookup, "TASK_TIMEOUT_MS", defaults.task_timeout_ms)?,
            retry_attempts: read_var(&lookup, "RETRY_ATTEMPTS", defaults.retry_attempts)?,
            worker_idle_timeout_ms: read_var(
                &lookup,
                "WORKER_IDLE_TIMEOUT_MS",
                defaults.worker_idle_timeout_ms,
            )?,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_var<F, V>(lookup: &F, suffix: &str, default: V) -> Result<V, String>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
    V::Err: std::fmt::Display,
{
    let key = format!("{ENV_PREFIX}{suffix}");
    match lookup(&key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{key}: cannot parse `{raw}`: {e}")),
        None => Ok(default),
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn duration_to_ms(duration: Duration) -> u64 {
    let ms = duration.as_millis();
    if ms > u64::MAX as u128 {
        u64::MAX
    } else {
        ms as u64
    }
}
