//! Bounded retry with priority escalation.

use crate::core::task::Priority;
use crate::core::TaskFailure;

/// What to do with a task whose attempt just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-enqueue immediately at `priority`, with no backoff.
    Retry {
        /// Class the task re-enters the queue with.
        priority: Priority,
    },
    /// Leave the task terminally failed.
    GiveUp,
}

/// Retries a failed task up to `max_retries` times, escalating it to `high`.
///
/// `attempt_count` is incremented when an execution starts, so attempt 1 is
/// the first run and a task executes at most `max_retries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    /// Policy allowing `max_retries` re-executions after the first attempt.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Configured retry bound.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Upper bound on executions of a single task.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether a task that has just failed its `attempt_count`-th attempt
    /// may run again.
    #[must_use]
    pub const fn should_retry(&self, attempt_count: u32) -> bool {
        attempt_count <= self.max_retries
    }

    /// Decide the fate of a task after a failed attempt.
    #[must_use]
    pub const fn decide(&self, attempt_count: u32) -> RetryDecision {
        if self.should_retry(attempt_count) {
            RetryDecision::Retry {
                priority: Priority::High,
            }
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Failure to record once the policy gives up.
    ///
    /// With retries disabled the last failure is recorded as-is.
    #[must_use]
    pub fn exhausted(&self, attempts: u32, last: TaskFailure) -> TaskFailure {
        if self.max_retries == 0 {
            last
        } else {
            TaskFailure::RetriesExhausted {
                attempts,
                last: Box::new(last),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_bound() {
        let policy = RetryPolicy::new(2);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert_eq!(policy.max_attempts(), 3);
    }

    #[test]
    fn test_retry_escalates_to_high() {
        let policy = RetryPolicy::new(1);
        assert_eq!(
            policy.decide(1),
            RetryDecision::Retry {
                priority: Priority::High
            }
        );
        assert_eq!(policy.decide(2), RetryDecision::GiveUp);
    }

    #[test]
    fn test_no_retries_configured() {
        let policy = RetryPolicy::new(0);
        assert_eq!(policy.decide(1), RetryDecision::GiveUp);
        let last = TaskFailure::Application("boom".into());
        assert_eq!(policy.exhausted(1, last.clone()), last);
    }

    #[test]
    fn test_exhausted_wraps_last_failure() {
        let policy = RetryPolicy::new(2);
        let failure = policy.exhausted(3, TaskFailure::Application("boom".into()));
        assert_eq!(
            failure,
            TaskFailure::RetriesExhausted {
                attempts: 3,
                last: Box::new(TaskFailure::Application("boom".into())),
            }
        );
    }
}
