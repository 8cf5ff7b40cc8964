// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository traits for the Task/Run/Worker/Project/NodeProject data model
//! (spec §3). The relational database itself is an out-of-scope external
//! collaborator (spec §1); these traits are the boundary the Scheduler and
//! transports code against, with an in-memory reference implementation for
//! single-node deployments and tests.

use crate::error::StorageError;
use async_trait::async_trait;
use grid_core::{NodeProject, Project, ProjectId, Run, RunId, Task, TaskId, Worker, WorkerId};
use parking_lot::RwLock;
use std::collections::HashMap;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get(&self, id: &TaskId) -> Result<Task, StorageError>;
    async fn put(&self, task: Task) -> Result<(), StorageError>;
    async fn delete(&self, id: &TaskId) -> Result<(), StorageError>;
    async fn list_active(&self) -> Result<Vec<Task>, StorageError>;
}

#[async_trait]
pub trait RunStore: Send + Sync {
    async fn get(&self, id: &RunId) -> Result<Run, StorageError>;
    async fn put(&self, run: Run) -> Result<(), StorageError>;
    async fn list_for_task(&self, task_id: &TaskId) -> Result<Vec<Run>, StorageError>;
    /// Runs currently in a non-terminal dispatch/runtime state for `task_id`
    /// (spec §8 invariant 8: `max_concurrent_instances` enforcement).
    async fn count_in_flight(&self, task_id: &TaskId) -> Result<u32, StorageError>;
}

#[async_trait]
pub trait WorkerStore: Send + Sync {
    async fn get(&self, id: &WorkerId) -> Result<Worker, StorageError>;
    async fn put(&self, worker: Worker) -> Result<(), StorageError>;
    async fn delete(&self, id: &WorkerId) -> Result<(), StorageError>;
    async fn list(&self) -> Result<Vec<Worker>, StorageError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get(&self, id: &ProjectId) -> Result<Project, StorageError>;
    async fn put(&self, project: Project) -> Result<(), StorageError>;
}

#[async_trait]
pub trait NodeProjectStore: Send + Sync {
    async fn get(&self, worker_id: &WorkerId, project_id: &ProjectId) -> Option<NodeProject>;
    async fn put(&self, row: NodeProject) -> Result<(), StorageError>;
    /// Every row for `project_id` (spec §3 invariant "a project modification
    /// sets every row to stale").
    async fn list_for_project(&self, project_id: &ProjectId) -> Result<Vec<NodeProject>, StorageError>;
}

/// Single-node in-memory reference implementation shared by all four store
/// traits, keyed by the entities' public ids (grounded on the teacher's
/// `MaterializedState` pattern of "derive read state, swap the whole map on
/// update" — see `grid_core::Snapshot`).
#[derive(Default)]
pub struct InMemoryStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    runs: RwLock<HashMap<RunId, Run>>,
    workers: RwLock<HashMap<WorkerId, Worker>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    node_projects: RwLock<HashMap<(WorkerId, ProjectId), NodeProject>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn get(&self, id: &TaskId) -> Result<Task, StorageError> {
        self.tasks.read().get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn put(&self, task: Task) -> Result<(), StorageError> {
        self.tasks.write().insert(task.id, task);
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), StorageError> {
        self.tasks.write().remove(id);
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.tasks.read().values().filter(|t| t.is_active).cloned().collect())
    }
}

#[async_trait]
impl RunStore for InMemoryStore {
    async fn get(&self, id: &RunId) -> Result<Run, StorageError> {
        self.runs.read().get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn put(&self, run: Run) -> Result<(), StorageError> {
        self.runs.write().insert(run.id, run);
        Ok(())
    }

    async fn list_for_task(&self, task_id: &TaskId) -> Result<Vec<Run>, StorageError> {
        Ok(self.runs.read().values().filter(|r| &r.task_ref == task_id).cloned().collect())
    }

    async fn count_in_flight(&self, task_id: &TaskId) -> Result<u32, StorageError> {
        Ok(self
            .runs
            .read()
            .values()
            .filter(|r| &r.task_ref == task_id && !r.status.is_terminal())
            .count() as u32)
    }
}

#[async_trait]
impl WorkerStore for InMemoryStore {
    async fn get(&self, id: &WorkerId) -> Result<Worker, StorageError> {
        self.workers.read().get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn put(&self, worker: Worker) -> Result<(), StorageError> {
        self.workers.write().insert(worker.id, worker);
        Ok(())
    }

    async fn delete(&self, id: &WorkerId) -> Result<(), StorageError> {
        self.workers.write().remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Worker>, StorageError> {
        Ok(self.workers.read().values().cloned().collect())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn get(&self, id: &ProjectId) -> Result<Project, StorageError> {
        self.projects.read().get(id).cloned().ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn put(&self, project: Project) -> Result<(), StorageError> {
        self.projects.write().insert(project.id, project);
        Ok(())
    }
}

#[async_trait]
impl NodeProjectStore for InMemoryStore {
    async fn get(&self, worker_id: &WorkerId, project_id: &ProjectId) -> Option<NodeProject> {
        self.node_projects.read().get(&(*worker_id, *project_id)).cloned()
    }

    async fn put(&self, row: NodeProject) -> Result<(), StorageError> {
        self.node_projects.write().insert((row.worker_ref, row.project_ref), row);
        Ok(())
    }

    async fn list_for_project(&self, project_id: &ProjectId) -> Result<Vec<NodeProject>, StorageError> {
        Ok(self
            .node_projects
            .read()
            .values()
            .filter(|row| &row.project_ref == project_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
