// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task (schedule template) domain type (spec §3 "Task").

use crate::backoff::BackoffConfig;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a Task template.
    pub struct TaskId("tsk-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    File,
    Code,
    Rule,
    Spider,
}

crate::simple_display! {
    TaskType {
        File => "file",
        Code => "code",
        Rule => "rule",
        Spider => "spider",
    }
}

/// Trigger kind (spec §3 `schedule`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Fires exactly once at the given epoch-millisecond timestamp.
    Once { at_epoch_ms: u64 },
    /// Standard 5-field cron expression, evaluated in `SCHEDULER_TIMEZONE`.
    Cron { expr: String },
    /// Fires every `seconds` after the previous fire.
    Interval { seconds: u64 },
    /// Never fires on its own; only triggered via the API or `task_trigger`.
    Manual,
}

/// How many times the task's run may be retried and with what spacing
/// (template-level cap; distinct from a [`crate::run::Run::attempt`]
/// counter — spec §9 open question).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: std::time::Duration,
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: std::time::Duration::from_secs(10),
            backoff: BackoffConfig::default(),
        }
    }
}

/// How the Scheduler resolves a Worker for a fire (spec §4.10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// `rule`-type tasks only: submitted to the co-located crawler executor.
    Local,
    /// Pin to one Worker; falls back to `Auto` if `fallback_enabled` and the
    /// Worker is not online.
    Fixed { worker: WorkerId },
    /// Try the project's bound Worker first, else `Auto`.
    PreferBound,
    /// Pick any eligible online Worker (spec §4.10 tie-break rules).
    Auto,
}

/// A reusable schedule template (spec §3 "Task").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub project_ref: String,
    pub task_type: TaskType,
    pub schedule: Schedule,
    pub max_concurrent_instances: u32,
    pub timeout_seconds: u64,
    pub retry_policy: RetryPolicy,
    pub is_active: bool,
    pub execution_strategy: ExecutionStrategy,
    pub fallback_enabled: bool,
    pub bound_worker_ref: Option<WorkerId>,
    pub owner_ref: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub last_run_ms: Option<u64>,
    pub next_run_ms: Option<u64>,
}

impl Task {
    /// Record a successful Run's completion against this template
    /// (idempotent from the caller's perspective only if called exactly
    /// once per terminal Run — see Scenario B in spec §8).
    pub fn record_success(&mut self, at_epoch_ms: u64) {
        self.success_count += 1;
        self.last_run_ms = Some(at_epoch_ms);
    }

    pub fn record_failure(&mut self, at_epoch_ms: u64) {
        self.failure_count += 1;
        self.last_run_ms = Some(at_epoch_ms);
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct TaskBuilder => Task {
        into {
            name: String = "nightly-sync",
            project_ref: String = "proj-1",
            owner_ref: String = "owner-1",
        }
        set {
            id: TaskId = TaskId::new(),
            task_type: TaskType = TaskType::Code,
            schedule: Schedule = Schedule::Manual,
            max_concurrent_instances: u32 = 1,
            timeout_seconds: u64 = 300,
            retry_policy: RetryPolicy = RetryPolicy::default(),
            is_active: bool = true,
            execution_strategy: ExecutionStrategy = ExecutionStrategy::Auto,
            fallback_enabled: bool = false,
            success_count: u64 = 0,
            failure_count: u64 = 0,
            last_run_ms: Option<u64> = None,
            next_run_ms: Option<u64> = None,
        }
        option {
            bound_worker_ref: WorkerId = None,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
