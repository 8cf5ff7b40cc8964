// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared upstream-facing Worker Transport contract (spec §4.7):
//! `dispatch`, `report_result`, `send_heartbeat`, `send_log*`,
//! `poll_control`/`ack_control`. Both [`crate::intranet::IntranetTransport`]
//! and [`crate::gateway::GatewayTransport`] implement it so the Scheduler and
//! the Node Registry never branch on mode.

use crate::error::TransportError;
use async_trait::async_trait;
use grid_core::{TaskId, Worker, WorkerId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task_id: TaskId,
    pub project_ref: String,
    pub entry_point: String,
    pub task_type: String,
    pub timeout_seconds: u64,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub accepted: bool,
    pub reason: Option<String>,
    pub task_id: TaskId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultReport {
    pub worker_id: WorkerId,
    pub task_id: TaskId,
    pub status: String,
    pub exit_code: Option<i32>,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub duration_ms: u64,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatReport {
    pub worker_id: WorkerId,
    pub status: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub running_tasks: u32,
    pub max_concurrent_tasks: u32,
    pub timestamp_ms: u64,
    pub os_info: Option<String>,
    pub capabilities: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStreamKind {
    Stdout,
    Stderr,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub run_id: String,
    pub stream: LogStreamKind,
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub level: String,
    pub content: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogChunk {
    pub run_id: String,
    pub stream: LogStreamKind,
    pub data: Vec<u8>,
    pub offset: u64,
    pub is_final: bool,
    pub total_size: Option<u64>,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlEnvelope {
    pub receipt_id: String,
    pub control_type: String,
    pub request_id: String,
    pub task_id: Option<TaskId>,
    pub run_id: Option<String>,
    pub reason: Option<String>,
    pub payload: Option<serde_json::Value>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Idempotent on `task.task_id` (spec §4.7 "Shared contract").
    async fn dispatch(
        &self,
        worker: &Worker,
        task: TaskPayload,
        ack_timeout: Duration,
    ) -> Result<DispatchOutcome, TransportError>;

    /// Idempotent on `result.task_id`; returns the cached outcome within
    /// the Receipt Cache TTL for a repeated call.
    async fn report_result(&self, result: ResultReport) -> Result<(), TransportError>;

    async fn send_heartbeat(&self, heartbeat: HeartbeatReport) -> Result<(), TransportError>;

    async fn send_log(&self, line: LogLine) -> Result<(), TransportError>;

    async fn send_log_batch(&self, lines: Vec<LogLine>) -> Result<(), TransportError>;

    async fn send_log_chunk(&self, chunk: LogChunk) -> Result<(), TransportError>;

    /// At-least-once; the handler applying a polled control message must be
    /// idempotent by `receipt_id` (spec §4.7).
    async fn poll_control(
        &self,
        worker_id: &WorkerId,
        timeout: Duration,
    ) -> Result<Option<ControlEnvelope>, TransportError>;

    async fn ack_control(&self, worker_id: &WorkerId, receipt_id: &str) -> Result<(), TransportError>;

    /// Master-initiated control push (spec §4.10 "Cancel"): delivered
    /// synchronously over the bidi stream in Intranet mode, or enqueued to
    /// the Worker's durable control queue in Gateway mode.
    async fn push_control(&self, worker: &Worker, envelope: ControlEnvelope) -> Result<(), TransportError>;
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
