// Scenario C (spec §8) — dispatch with retry: a Worker rejects the first
// two dispatch attempts, the third succeeds. Three Runs must exist for the
// Task, and the latest carries attempt 3 (retry_count 2) and status success.

use grid_core::{ExecutionStatus, ExecutionStrategy, TaskBuilder, Transition, WorkerBuilder, WorkerStatus};
use grid_scheduler::{ControlEventBus, ExecutionResolver, FireOutcome, InMemoryControlEventBus, MasterScheduler, NodeRegistry, SchedulerShared};
use grid_storage::{InMemoryStore, RunStore, TaskStore, WorkerStore};
use grid_transport::{DispatchOutcome, FakeTransport};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn dispatch_retries_until_the_worker_accepts() {
    let store = Arc::new(InMemoryStore::new());
    let transport = Arc::new(FakeTransport::new());
    let health = Arc::new(NodeRegistry::new(Duration::from_secs(30)));

    let worker = WorkerBuilder::default().status(WorkerStatus::Online).build();
    health.seed(worker.id, WorkerStatus::Online, 0);
    health.observe_heartbeat(worker.id, 0, grid_core::WorkerMetrics::default());
    WorkerStore::put(store.as_ref(), worker.clone()).await.unwrap();

    let mut task = TaskBuilder::default().execution_strategy(ExecutionStrategy::Fixed { worker: worker.id }).build();
    task.retry_policy.max_retries = 2;
    TaskStore::put(store.as_ref(), task.clone()).await.unwrap();

    let resolver = ExecutionResolver::new(store.clone(), health);
    let bus: Arc<dyn ControlEventBus> = Arc::new(InMemoryControlEventBus::new(10));
    let shared = Arc::new(SchedulerShared::new(
        store.clone(),
        store.clone(),
        store.clone(),
        transport.clone(),
        resolver,
        bus,
        4,
        Duration::from_secs(1),
    ));
    let scheduler = MasterScheduler::new(shared);

    // First two dispatches are rejected by the Worker as busy.
    for _ in 0..2 {
        transport.set_next_outcome(Ok(DispatchOutcome {
            accepted: false,
            reason: Some("worker_busy".into()),
            task_id: task.id,
        }));
        let run_id = match scheduler.fire(task.id).await.unwrap() {
            FireOutcome::DispatchFailed { run_id, .. } => run_id,
            other => panic!("expected DispatchFailed, got {other:?}"),
        };
        let failed_run = RunStore::get(store.as_ref(), &run_id).await.unwrap();
        let delay = scheduler.next_retry_delay(&task, &failed_run);
        assert!(delay.is_some(), "retries should remain within the retry budget");
    }

    // Third dispatch is accepted.
    let outcome = scheduler.fire(task.id).await.unwrap();
    let run_id = match outcome {
        FireOutcome::Dispatched { run_id } => run_id,
        other => panic!("expected Dispatched on the third attempt, got {other:?}"),
    };

    let runs = RunStore::list_for_task(store.as_ref(), &task.id).await.unwrap();
    assert_eq!(runs.len(), 3, "exactly three runs should exist for the task");

    let mut latest = RunStore::get(store.as_ref(), &run_id).await.unwrap();
    assert_eq!(latest.attempt, 3);
    latest.apply(Transition::RuntimeStarted, 10_000).unwrap();
    latest.apply(Transition::RuntimeSucceeded, 11_000).unwrap();
    RunStore::put(store.as_ref(), latest.clone()).await.unwrap();
    assert_eq!(latest.status, ExecutionStatus::Success);
}
