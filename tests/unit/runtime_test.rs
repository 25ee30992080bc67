//! Tests for runtime adapters

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use prometheus_task_scheduler::core::Spawn;
use prometheus_task_scheduler::runtime::TokioSpawner;

#[tokio::test]
async fn test_tokio_spawner_runs_future() {
    let spawner = TokioSpawner::current().unwrap();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let (tx, rx) = tokio::sync::oneshot::channel();

    spawner.spawn(async move {
        flag.store(true, Ordering::SeqCst);
        let _ = tx.send(());
    });

    rx.await.unwrap();
    assert!(ran.load(Ordering::SeqCst));
}
