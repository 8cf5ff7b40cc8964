// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (spec §4.10, component C10): concurrency-safe fire, the
//! execution resolver hookup, retry orchestration, cancel, and rule-task
//! fan-out.
//!
//! Role is configuration, not election (spec §9): [`MasterScheduler`] is
//! the only type with a `fire`/`cancel`/`reap_stalled` method at all — a
//! process running in control role is handed a [`ControlScheduler`]
//! instead, whose API has no such methods to call in the first place.

use crate::control_bus::{task_changed, task_trigger, ControlEventBus};
use crate::error::SchedulerError;
use crate::resolver::{ExecutionResolver, Resolution};
use grid_core::{
    BackoffEngine, PaginationConfig, Project, ProjectDetail, Run, RunId, Task, TaskId, Transition,
};
use grid_storage::{RunStore, TaskStore};
use grid_transport::{TaskPayload, Transport};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Shared wiring both roles need; only [`MasterScheduler`] exposes the
/// methods that actually use the scheduling-critical fields.
pub struct SchedulerShared {
    pub tasks: Arc<dyn TaskStore>,
    pub runs: Arc<dyn RunStore>,
    pub workers: Arc<dyn grid_storage::WorkerStore>,
    pub transport: Arc<dyn Transport>,
    pub resolver: ExecutionResolver,
    pub bus: Arc<dyn ControlEventBus>,
    pub concurrency: Semaphore,
    pub ack_timeout: Duration,
    pub dispatch_stall_limit: Duration,
    pub run_heartbeat_limit: Duration,
    backoffs: Mutex<HashMap<TaskId, BackoffEngine>>,
}

impl SchedulerShared {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        runs: Arc<dyn RunStore>,
        workers: Arc<dyn grid_storage::WorkerStore>,
        transport: Arc<dyn Transport>,
        resolver: ExecutionResolver,
        bus: Arc<dyn ControlEventBus>,
        max_concurrent_tasks: usize,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            tasks,
            runs,
            workers,
            transport,
            resolver,
            bus,
            concurrency: Semaphore::new(max_concurrent_tasks),
            ack_timeout,
            dispatch_stall_limit: Duration::from_secs(120),
            run_heartbeat_limit: Duration::from_secs(90),
            backoffs: Mutex::new(HashMap::new()),
        }
    }
}

/// A fire's outcome, reported back to the caller driving the trigger loop.
#[derive(Debug)]
pub enum FireOutcome {
    Dispatched { run_id: RunId },
    Skipped,
    DispatchFailed { run_id: RunId, reason: String },
}

/// One expanded rule-task page dispatch (spec §4.10 "Rule-task fan-out").
#[derive(Debug)]
pub struct FanoutChild {
    pub page: u32,
    pub correlation_id: String,
    pub outcome: FireOutcome,
}

pub struct MasterScheduler {
    shared: Arc<SchedulerShared>,
}

impl MasterScheduler {
    pub fn new(shared: Arc<SchedulerShared>) -> Self {
        Self { shared }
    }

    /// Spec §4.10 "Concurrency-safe fire", steps 1-6.
    pub async fn fire(&self, task_id: TaskId) -> Result<FireOutcome, SchedulerError> {
        let task = self.shared.tasks.get(&task_id).await?;
        if !task.is_active {
            tracing::debug!(%task_id, "skipping fire: task inactive");
            return Ok(FireOutcome::Skipped);
        }
        let in_flight = self.shared.runs.count_in_flight(&task_id).await?;
        if in_flight >= task.max_concurrent_instances {
            tracing::debug!(%task_id, in_flight, "skipping fire: concurrency limit reached");
            return Ok(FireOutcome::Skipped);
        }

        let _permit = self
            .shared
            .concurrency
            .acquire()
            .await
            .map_err(|_| SchedulerError::Internal("concurrency semaphore closed".into()))?;

        let attempt = self.shared.runs.list_for_task(&task_id).await?.len() as u32 + 1;
        let mut run = Run::new(RunId::new(), task_id, attempt);
        run.apply(Transition::BeginDispatch, now_ms())
            .map_err(SchedulerError::from)?;
        self.shared.runs.put(run.clone()).await?;

        self.dispatch_run(&task, run).await
    }

    async fn dispatch_run(&self, task: &Task, mut run: Run) -> Result<FireOutcome, SchedulerError> {
        let resolution = self
            .shared
            .resolver
            .resolve(&task.execution_strategy, task.bound_worker_ref, task.fallback_enabled)
            .await;

        let worker = match resolution {
            Ok(Resolution::Local) => {
                run.apply(Transition::DispatchAccepted, now_ms())?;
                self.shared.runs.put(run.clone()).await?;
                return Ok(FireOutcome::Dispatched { run_id: run.id });
            }
            Ok(Resolution::Remote(worker)) => worker,
            Err(err) => {
                let reason = err.to_string();
                run.apply(Transition::DispatchFailed(reason.clone().into()), now_ms())?;
                self.shared.runs.put(run.clone()).await?;
                return Ok(FireOutcome::DispatchFailed { run_id: run.id, reason });
            }
        };

        let payload = TaskPayload {
            task_id: task.id,
            project_ref: task.project_ref.clone(),
            entry_point: String::new(),
            task_type: task.task_type.to_string(),
            timeout_seconds: task.timeout_seconds,
            payload: serde_json::json!({}),
        };

        match self.shared.transport.dispatch(&worker, payload, self.shared.ack_timeout).await {
            Ok(outcome) if outcome.accepted => {
                run.worker_ref = Some(worker.id);
                run.apply(Transition::DispatchAccepted, now_ms())?;
                self.shared.runs.put(run.clone()).await?;
                Ok(FireOutcome::Dispatched { run_id: run.id })
            }
            Ok(outcome) => {
                let reason = outcome.reason.unwrap_or_else(|| "rejected by worker".to_string());
                run.apply(Transition::DispatchFailed(reason.clone().into()), now_ms())?;
                self.shared.runs.put(run.clone()).await?;
                Ok(FireOutcome::DispatchFailed { run_id: run.id, reason })
            }
            Err(err) => {
                let reason = err.to_string();
                let transition =
                    if matches!(err, grid_transport::TransportError::AckTimeout) { Transition::DispatchTimedOut } else { Transition::DispatchFailed(reason.clone().into()) };
                run.apply(transition, now_ms())?;
                self.shared.runs.put(run.clone()).await?;
                Ok(FireOutcome::DispatchFailed { run_id: run.id, reason })
            }
        }
    }

    /// Spec §4.10 "Retry orchestration": schedule a one-shot fire at
    /// `now + backoff.next()` for a terminal failed/timeout Run whose
    /// `retry_count < task.max_retries`. Returns the delay to wait before
    /// the caller re-fires this task, or `None` if retries are exhausted.
    pub fn next_retry_delay(&self, task: &Task, run: &Run) -> Option<Duration> {
        if !matches!(run.status, grid_core::ExecutionStatus::Failed(_) | grid_core::ExecutionStatus::Timeout) {
            return None;
        }
        if run.attempt > task.retry_policy.max_retries {
            return None;
        }
        let mut backoffs = self.shared.backoffs.lock();
        let engine = backoffs.entry(task.id).or_insert_with(|| BackoffEngine::new(task.retry_policy.backoff));
        Some(engine.next())
    }

    pub fn reset_retry_series(&self, task_id: &TaskId) {
        self.shared.backoffs.lock().remove(task_id);
    }

    /// Spec §4.10 "Cancel": publish a control message and move the runtime
    /// axis to `cancelled` on confirmation.
    pub async fn cancel(&self, run_id: RunId, reason: String) -> Result<(), SchedulerError> {
        let mut run = self.shared.runs.get(&run_id).await?;
        let Some(worker_id) = run.worker_ref else {
            return Err(SchedulerError::NotEligible);
        };
        let worker = self.shared.workers.get(&worker_id).await?;
        let envelope = grid_transport::ControlEnvelope {
            receipt_id: nanoid::nanoid!(16),
            control_type: "cancel".to_string(),
            request_id: nanoid::nanoid!(16),
            task_id: Some(run.task_ref),
            run_id: Some(run_id.to_string()),
            reason: Some(reason),
            payload: None,
        };
        self.shared.transport.push_control(&worker, envelope).await?;
        run.apply(Transition::RuntimeCancelled, now_ms())?;
        self.shared.runs.put(run).await?;
        Ok(())
    }

    /// Spec §4.9 "Orphans": runs stuck in `dispatching` longer than
    /// `DISPATCH_STALL_LIMIT` are reaped into `failed`.
    pub async fn reap_stalled(&self, task_id: &TaskId, now_ms: u64) -> Result<Vec<RunId>, SchedulerError> {
        let mut reaped = Vec::new();
        for mut run in self.shared.runs.list_for_task(task_id).await? {
            if !matches!(run.status, grid_core::ExecutionStatus::Dispatching) {
                continue;
            }
            let Some(start) = run.start_time_ms else { continue };
            if now_ms.saturating_sub(start) > self.shared.dispatch_stall_limit.as_millis() as u64 {
                run.apply(Transition::DispatchFailed("dispatch_stalled".into()), now_ms)?;
                let run_id = run.id;
                self.shared.runs.put(run).await?;
                reaped.push(run_id);
            }
        }
        Ok(reaped)
    }

    /// Spec §4.10 "Rule-task fan-out": expand a rule project's pagination
    /// config into one independent child dispatch per page.
    pub async fn fire_rule_fanout(
        &self,
        task_id: TaskId,
        project: &Project,
        execution_id: &str,
    ) -> Result<Vec<FanoutChild>, SchedulerError> {
        let pagination = match &project.detail {
            ProjectDetail::Rule(rule) => rule.pagination.clone(),
            _ => None,
        };
        let Some(pagination) = pagination else {
            let outcome = self.fire(task_id).await?;
            return Ok(vec![FanoutChild { page: 0, correlation_id: execution_id.to_string(), outcome }]);
        };

        let mut children = Vec::new();
        for (page, _url) in PaginationConfig::expand(&pagination) {
            let correlation_id = format!("{execution_id}_page_{page}");
            // Each child is an independent submit; a failure here does not
            // roll back earlier children (spec §4.10).
            let outcome = self.fire(task_id).await.unwrap_or(FireOutcome::Skipped);
            children.push(FanoutChild { page, correlation_id, outcome });
        }
        Ok(children)
    }
}

/// A scheduler running in control role: no access to `fire`/`cancel` at
/// all, only to publishing the two reminder events master consumes
/// (spec §4.10 "Role").
pub struct ControlScheduler {
    bus: Arc<dyn ControlEventBus>,
}

impl ControlScheduler {
    pub fn new(bus: Arc<dyn ControlEventBus>) -> Self {
        Self { bus }
    }

    pub fn publish_task_changed(&self, task_id: TaskId, now_ms: u64) {
        self.bus.publish(task_changed(task_id, now_ms));
    }

    pub fn publish_task_trigger(&self, task_id: TaskId, now_ms: u64) {
        self.bus.publish(task_trigger(task_id, now_ms));
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
