// Scenario A (spec §8) — happy-path dispatch: a cron Task fires onto its
// only online Worker, the Worker accepts, and a successful result rolls up
// into the Task's counters.

use grid_core::{ExecutionStatus, ExecutionStrategy, Schedule, TaskBuilder, Transition, WorkerBuilder, WorkerStatus};
use grid_scheduler::{ControlEventBus, ExecutionResolver, FireOutcome, InMemoryControlEventBus, MasterScheduler, NodeRegistry, SchedulerShared};
use grid_storage::{InMemoryStore, RunStore, TaskStore, WorkerStore};
use grid_transport::FakeTransport;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn happy_path_dispatch_accepts_and_succeeds() {
    let store = Arc::new(InMemoryStore::new());
    let transport = Arc::new(FakeTransport::new());
    let health = Arc::new(NodeRegistry::new(Duration::from_secs(30)));

    let worker = WorkerBuilder::default().status(WorkerStatus::Online).build();
    health.seed(worker.id, WorkerStatus::Online, 0);
    health.observe_heartbeat(worker.id, 0, grid_core::WorkerMetrics::default());
    WorkerStore::put(store.as_ref(), worker.clone()).await.unwrap();

    let task = TaskBuilder::default()
        .project_ref("code-v1")
        .schedule(Schedule::Cron { expr: "* * * * *".into() })
        .execution_strategy(ExecutionStrategy::Fixed { worker: worker.id })
        .build();
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

    let outcome = scheduler.fire(task.id).await.unwrap();
    let run_id = match outcome {
        FireOutcome::Dispatched { run_id } => run_id,
        other => panic!("expected Dispatched, got {other:?}"),
    };
    assert_eq!(transport.dispatched.lock().len(), 1);
    let (dispatched_worker, _) = &transport.dispatched.lock()[0];
    assert_eq!(*dispatched_worker, worker.id);

    let mut run = RunStore::get(store.as_ref(), &run_id).await.unwrap();
    assert_eq!(run.status, ExecutionStatus::Queued);

    run.apply(Transition::RuntimeStarted, 1_000).unwrap();
    run.apply(Transition::RuntimeSucceeded, 2_000).unwrap();
    run.exit_code = Some(0);
    RunStore::put(store.as_ref(), run.clone()).await.unwrap();
    assert_eq!(run.status, ExecutionStatus::Success);

    let mut task = TaskStore::get(store.as_ref(), &task.id).await.unwrap();
    task.record_success(2_000);
    TaskStore::put(store.as_ref(), task.clone()).await.unwrap();
    assert_eq!(task.success_count, 1);
}
