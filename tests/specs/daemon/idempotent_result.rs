// Scenario B (spec §8) — idempotent result: a Worker reports the same
// result twice (a network-retry duplicate). The Run is marked success
// exactly once and the Task's success_count is incremented once, not twice.

use grid_daemon::config::Config;
use grid_daemon::ingest;
use grid_daemon::state::AppState;
use grid_core::{ExecutionStatus, RunBuilder, TaskBuilder};
use grid_storage::{FsObjectStore, RunStore, TaskStore};
use grid_transport::{FakeTransport, ResultReport, Transport};
use std::sync::Arc;

#[tokio::test]
async fn duplicate_result_report_is_applied_once() {
    let dir = tempfile::tempdir().unwrap();
    let object_store = Arc::new(FsObjectStore::new(dir.path()));
    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());
    let state = Arc::new(AppState::new(Config::default(), transport, None, object_store));

    let task = TaskBuilder::default().build();
    TaskStore::put(state.store.as_ref(), task.clone()).await.unwrap();
    let run = RunBuilder::default().task_ref(task.id).status(ExecutionStatus::Running).build();
    RunStore::put(state.store.as_ref(), run.clone()).await.unwrap();

    let report = ResultReport {
        worker_id: grid_core::WorkerId::new(),
        task_id: task.id,
        status: "success".into(),
        exit_code: Some(0),
        started_at_ms: 0,
        finished_at_ms: 100,
        duration_ms: 100,
        data: None,
    };

    ingest::apply_result(&state, report.clone()).await.unwrap();
    // Worker retries the same push after a network timeout.
    ingest::apply_result(&state, report).await.unwrap();

    let stored = RunStore::get(state.store.as_ref(), &run.id).await.unwrap();
    assert_eq!(stored.status, ExecutionStatus::Success);

    let task = TaskStore::get(state.store.as_ref(), &task.id).await.unwrap();
    assert_eq!(task.success_count, 1);
}
