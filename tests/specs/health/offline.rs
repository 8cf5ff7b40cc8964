// Scenario F (spec §8) — heartbeat-driven offline: a Worker that stops
// heartbeating is flipped OFFLINE by the next health scan once T_offline
// has elapsed, and the `auto` resolver then skips it. A fresh heartbeat
// brings it back ONLINE and eligible again.

use grid_core::{WorkerBuilder, WorkerMetrics, WorkerStatus};
use grid_scheduler::{ExecutionResolver, NodeRegistry, Resolution};
use grid_storage::{InMemoryStore, WorkerStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn silent_worker_goes_offline_and_recovers() {
    const T_OFFLINE_SECS: u64 = 90;
    let store = Arc::new(InMemoryStore::new());
    let health = Arc::new(NodeRegistry::new(Duration::from_secs(T_OFFLINE_SECS)));

    let worker = WorkerBuilder::default().status(WorkerStatus::Online).build();
    WorkerStore::put(store.as_ref(), worker.clone()).await.unwrap();
    health.observe_heartbeat(worker.id, 0, WorkerMetrics::default());

    let resolver = ExecutionResolver::new(store.clone(), health.clone());
    let strategy = grid_core::ExecutionStrategy::Fixed { worker: worker.id };

    // Still within T_offline: eligible.
    assert!(matches!(resolver.resolve(&strategy, None, false).await.unwrap(), Resolution::Remote(_)));

    // last_heartbeat + 91s: the next scan flips it offline.
    let now_ms = (T_OFFLINE_SECS + 1) * 1_000;
    let events = health.scan(now_ms);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].from, WorkerStatus::Online);
    assert_eq!(events[0].to, WorkerStatus::Offline);

    let mut stored = WorkerStore::get(store.as_ref(), &worker.id).await.unwrap();
    stored.status = events[0].to;
    WorkerStore::put(store.as_ref(), stored).await.unwrap();

    // A subsequent auto resolver run skips the now-offline worker.
    let outcome = resolver.resolve(&grid_core::ExecutionStrategy::Auto, None, false).await;
    assert!(outcome.is_err(), "auto resolution should find no eligible worker");

    // Worker resumes heartbeating: back online and eligible.
    health.observe_heartbeat(worker.id, now_ms + 1_000, WorkerMetrics::default());
    assert!(matches!(resolver.resolve(&strategy, None, false).await.unwrap(), Resolution::Remote(_)));
}
