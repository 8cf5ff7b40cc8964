// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run (execution record) domain type (spec §3 "Run").

use crate::status::{ExecutionStatus, IllegalTransition, Transition};
use crate::task::TaskId;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for one Task invocation.
    pub struct RunId("run-");
}

/// One invocation of a [`crate::task::Task`] (spec §3 "Run").
///
/// `status` is never stored independently of `apply`'s return value — see
/// [`crate::status::ExecutionStatus`] for why the two-axis columns cannot
/// disagree with the aggregate here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub task_ref: TaskId,
    pub worker_ref: Option<WorkerId>,
    pub status: ExecutionStatus,
    pub start_time_ms: Option<u64>,
    pub end_time_ms: Option<u64>,
    pub exit_code: Option<i32>,
    /// This run's 1-based attempt number. Distinct from
    /// `Task.retry_policy.max_retries` (spec §9 open question).
    pub attempt: u32,
    pub error_message: Option<String>,
    pub result_data: Option<serde_json::Value>,
    pub last_heartbeat_ms: Option<u64>,
    pub log_file_ref: String,
    pub error_log_ref: String,
}

impl Run {
    pub fn new(id: RunId, task_ref: TaskId, attempt: u32) -> Self {
        let log_file_ref = format!("logs/{id}/stdout.jsonl");
        let error_log_ref = format!("logs/{id}/stderr.jsonl");
        Self {
            id,
            task_ref,
            worker_ref: None,
            status: ExecutionStatus::Pending,
            start_time_ms: None,
            end_time_ms: None,
            exit_code: None,
            attempt,
            error_message: None,
            result_data: None,
            last_heartbeat_ms: None,
            log_file_ref,
            error_log_ref,
        }
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match (self.start_time_ms, self.end_time_ms) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }

    /// Apply a status transition, refusing the write if the current status
    /// is already terminal (spec §8 invariant 2: administrative purge is
    /// the only exception, and this method does not model purge).
    pub fn apply(&mut self, transition: Transition, now_ms: u64) -> Result<(), IllegalTransition> {
        if self.status.is_terminal() {
            return Err(IllegalTransition {
                from: self.status.clone(),
                transition,
            });
        }
        let next = std::mem::replace(&mut self.status, ExecutionStatus::Pending).apply(transition)?;
        if matches!(next, ExecutionStatus::Running) && self.start_time_ms.is_none() {
            self.start_time_ms = Some(now_ms);
        }
        if next.is_terminal() {
            self.end_time_ms = Some(now_ms);
            if let ExecutionStatus::Failed(reason) = &next {
                self.error_message = Some(reason.0.clone());
            }
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct RunBuilder => Run {
        into {
            log_file_ref: String = "logs/run-test/stdout.jsonl",
            error_log_ref: String = "logs/run-test/stderr.jsonl",
        }
        set {
            id: RunId = RunId::new(),
            task_ref: TaskId = TaskId::new(),
            worker_ref: Option<WorkerId> = None,
            status: ExecutionStatus = ExecutionStatus::Pending,
            start_time_ms: Option<u64> = None,
            end_time_ms: Option<u64> = None,
            exit_code: Option<i32> = None,
            attempt: u32 = 1,
            error_message: Option<String> = None,
            result_data: Option<serde_json::Value> = None,
            last_heartbeat_ms: Option<u64> = None,
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
