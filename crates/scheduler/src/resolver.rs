// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution resolver (spec §4.10 "Execution resolver"): picks the Worker a
//! fire dispatches to, given the task's [`ExecutionStrategy`].

use crate::error::SchedulerError;
use crate::health::NodeRegistry;
use grid_core::{ExecutionStrategy, Worker, WorkerId, WorkerStatus};
use grid_storage::WorkerStore;
use std::sync::Arc;

pub struct ExecutionResolver {
    workers: Arc<dyn WorkerStore>,
    health: Arc<NodeRegistry>,
}

/// Outcome of resolving a Worker for a fire. `Local` carries no Worker — the
/// caller submits to the co-located crawler executor instead of a remote
/// Worker (spec §4.10 `local` strategy).
pub enum Resolution {
    Local,
    Remote(Worker),
}

impl ExecutionResolver {
    pub fn new(workers: Arc<dyn WorkerStore>, health: Arc<NodeRegistry>) -> Self {
        Self { workers, health }
    }

    pub async fn resolve(
        &self,
        strategy: &ExecutionStrategy,
        bound_worker: Option<WorkerId>,
        fallback_enabled: bool,
    ) -> Result<Resolution, SchedulerError> {
        match strategy {
            ExecutionStrategy::Local => Ok(Resolution::Local),
            ExecutionStrategy::Fixed { worker } => self.resolve_fixed(*worker, fallback_enabled).await,
            ExecutionStrategy::PreferBound => match bound_worker {
                Some(worker_id) if self.is_online(&worker_id) => {
                    let worker = self.workers.get(&worker_id).await?;
                    Ok(Resolution::Remote(worker))
                }
                _ => self.resolve_auto(&std::collections::HashMap::new()).await,
            },
            ExecutionStrategy::Auto => self.resolve_auto(&std::collections::HashMap::new()).await,
        }
    }

    async fn resolve_fixed(&self, worker_id: WorkerId, fallback_enabled: bool) -> Result<Resolution, SchedulerError> {
        if self.is_online(&worker_id) {
            let worker = self.workers.get(&worker_id).await?;
            return Ok(Resolution::Remote(worker));
        }
        if fallback_enabled {
            return self.resolve_auto(&std::collections::HashMap::new()).await;
        }
        Err(SchedulerError::WorkerUnavailable(worker_id.to_string()))
    }

    /// `auto` strategy tie-break (spec §4.10): least `running_tasks`, then
    /// lowest `cpu_percent`, then most recent heartbeat.
    async fn resolve_auto(
        &self,
        required_capabilities: &std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<Resolution, SchedulerError> {
        let candidates = self.workers.list().await?;
        let best = candidates
            .into_iter()
            .filter(|w| self.is_online(&w.id))
            .filter(|w| w.satisfies(required_capabilities))
            .min_by(|a, b| self.rank(a).cmp(&self.rank(b)));

        best.map(Resolution::Remote)
            .ok_or_else(|| SchedulerError::WorkerUnavailable("no eligible online worker".into()))
    }

    fn rank(&self, worker: &Worker) -> (u32, i64, std::cmp::Reverse<u64>) {
        let metrics = self.health.metrics(&worker.id);
        let running_tasks = metrics.as_ref().map(|m| m.running_tasks).unwrap_or(u32::MAX);
        let cpu_percent = metrics.as_ref().map(|m| (m.cpu_percent * 1000.0) as i64).unwrap_or(i64::MAX);
        let last_heartbeat = worker.last_heartbeat_ms.unwrap_or(0);
        (running_tasks, cpu_percent, std::cmp::Reverse(last_heartbeat))
    }

    fn is_online(&self, worker_id: &WorkerId) -> bool {
        self.health.status(worker_id) == Some(WorkerStatus::Online)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
