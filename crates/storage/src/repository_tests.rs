// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use grid_core::{RunBuilder, TaskBuilder, WorkerBuilder};

#[tokio::test]
async fn task_put_get_roundtrips() {
    let store = InMemoryStore::new();
    let task = TaskBuilder::default().build();
    TaskStore::put(&store, task.clone()).await.unwrap();
    let fetched = TaskStore::get(&store, &task.id).await.unwrap();
    assert_eq!(fetched.id, task.id);
}

#[tokio::test]
async fn missing_task_is_not_found() {
    let store = InMemoryStore::new();
    let err = TaskStore::get(&store, &grid_core::TaskId::new()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn count_in_flight_excludes_terminal_runs() {
    let store = InMemoryStore::new();
    let task = TaskBuilder::default().build();
    let running = RunBuilder::default().task_ref(task.id).status(grid_core::ExecutionStatus::Running).build();
    let done = RunBuilder::default().task_ref(task.id).status(grid_core::ExecutionStatus::Success).build();
    RunStore::put(&store, running).await.unwrap();
    RunStore::put(&store, done).await.unwrap();
    assert_eq!(RunStore::count_in_flight(&store, &task.id).await.unwrap(), 1);
}

#[tokio::test]
async fn node_project_upsert_overwrites_by_composite_key() {
    let store = InMemoryStore::new();
    let worker = WorkerBuilder::default().build();
    let project_id = grid_core::ProjectId::new();
    let row = grid_core::NodeProject {
        worker_ref: worker.id,
        project_ref: project_id,
        file_hash: "h1".into(),
        file_size: 10,
        transfer_method: "intranet".into(),
        synced_at_ms: 1,
        status: grid_core::SyncStatus::Synced,
        sync_count: 1,
        last_used_at_ms: None,
        files: vec![],
    };
    NodeProjectStore::put(&store, row.clone()).await.unwrap();
    let mut updated = row.clone();
    updated.sync_count = 2;
    NodeProjectStore::put(&store, updated).await.unwrap();

    let fetched = NodeProjectStore::get(&store, &worker.id, &project_id).await.unwrap();
    assert_eq!(fetched.sync_count, 2);
    assert_eq!(NodeProjectStore::list_for_project(&store, &project_id).await.unwrap().len(), 1);
}
