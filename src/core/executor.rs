//! Task execution under a timeout race.
//!
//! The unit of work is spawned detached and its outcome is sent back over a
//! oneshot channel. The executor waits on that channel under
//! `tokio::time::timeout`. When the timer wins, only the waiting stops: the
//! detached work keeps running to completion and its outcome is discarded,
//! because an opaque future cannot be cancelled safely from outside.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;

use crate::core::task::UnitOfWork;
use crate::core::TaskFailure;

/// Abstraction for spawning detached futures on a runtime.
pub trait Spawn {
    /// Spawn an async task that runs to completion on its own.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Run one attempt of `work`, waiting at most `timeout` for it to settle.
///
/// # Errors
///
/// - [`TaskFailure::Application`] if the work returned an error
/// - [`TaskFailure::Timeout`] if it did not settle in time
/// - [`TaskFailure::Panicked`] if it panicked
/// - [`TaskFailure::Aborted`] if it was dropped without reporting
pub async fn run_with_timeout<T, S>(
    spawner: &S,
    work: Arc<dyn UnitOfWork<T>>,
    timeout: Duration,
) -> Result<T, TaskFailure>
where
    T: Send + 'static,
    S: Spawn,
{
    let (tx, rx) = oneshot::channel::<Result<T, TaskFailure>>();

    spawner.spawn(async move {
        let outcome = match AssertUnwindSafe(work.run()).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(TaskFailure::Application(format!("{err:#}"))),
            Err(panic) => Err(TaskFailure::Panicked(panic_message(panic.as_ref()))),
        };
        if tx.send(outcome).is_err() {
            tracing::debug!("outcome discarded, executor stopped waiting");
        }
    });

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => Err(TaskFailure::Aborted),
        Err(_) => Err(TaskFailure::Timeout(timeout)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
