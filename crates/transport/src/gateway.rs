// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway transport (spec §4.7, Gateway mode). Master enqueues dispatch and
//! control messages onto bounded per-Worker durable queues; the Worker pulls
//! via `PollTask`/`PollControl` and acks via `AckTask`/`AckControl`. The
//! queues here are in-process — a documented seam for swapping in a real
//! durable stream without touching the `Transport` impl (spec §1 treats
//! message-queue streams as an out-of-scope external collaborator).

use crate::error::TransportError;
use crate::transport::{
    ControlEnvelope, DispatchOutcome, HeartbeatReport, LogChunk, LogLine, ResultReport, TaskPayload, Transport,
};
use async_trait::async_trait;
use grid_core::{ReceiptCache, Worker, WorkerId};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Bound on a single Worker's pending-task queue before dispatch is refused
/// (spec §9 open question left unresolved for this constant; resolved here
/// the same way `MAX_PENDING_RECONNECTS` resolves the reconnect queue).
pub const MAX_PENDING_TASKS_PER_WORKER: usize = 256;

struct PendingTask {
    receipt_id: String,
    payload: TaskPayload,
}

#[derive(Default)]
struct Queues {
    tasks: HashMap<WorkerId, VecDeque<PendingTask>>,
    controls: HashMap<WorkerId, VecDeque<ControlEnvelope>>,
}

pub struct GatewayTransport {
    queues: Mutex<Queues>,
    result_cache: ReceiptCache<bool>,
    ack_cache: ReceiptCache<bool>,
}

impl Default for GatewayTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayTransport {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(Queues::default()),
            result_cache: ReceiptCache::new(Duration::from_secs(600)),
            ack_cache: ReceiptCache::new(Duration::from_secs(600)),
        }
    }

    /// Worker-side pull (spec §4.7 table "Dispatch task to Worker", Gateway
    /// column: `PollTask`).
    pub fn poll_task(&self, worker_id: &WorkerId) -> Option<(TaskPayload, String)> {
        let mut queues = self.queues.lock();
        let queue = queues.tasks.get_mut(worker_id)?;
        let pending = queue.pop_front()?;
        Some((pending.payload, pending.receipt_id))
    }

    /// Worker-side ack (spec §4.7 table, Gateway column: `AckTask`).
    /// Idempotent on `receipt_id` via the ack Receipt Cache.
    pub fn ack_task(&self, worker_id: &WorkerId, receipt_id: &str) -> Result<(), TransportError> {
        if self.ack_cache.check(worker_id.as_str(), receipt_id).is_some() {
            return Ok(());
        }
        self.ack_cache.record(worker_id.as_str(), receipt_id, true);
        Ok(())
    }

}

#[async_trait]
impl Transport for GatewayTransport {
    async fn dispatch(
        &self,
        worker: &Worker,
        task: TaskPayload,
        _ack_timeout: Duration,
    ) -> Result<DispatchOutcome, TransportError> {
        let receipt_id = nanoid::nanoid!(16);
        let mut queues = self.queues.lock();
        let queue = queues.tasks.entry(worker.id).or_default();
        if queue.len() >= MAX_PENDING_TASKS_PER_WORKER {
            return Ok(DispatchOutcome {
                accepted: false,
                reason: Some("worker queue full".to_string()),
                task_id: task.task_id,
            });
        }
        let task_id = task.task_id;
        queue.push_back(PendingTask { receipt_id, payload: task });
        Ok(DispatchOutcome { accepted: true, reason: None, task_id })
    }

    async fn report_result(&self, result: ResultReport) -> Result<(), TransportError> {
        let key = result.task_id.to_string();
        if self.result_cache.check(result.worker_id.as_str(), &key).is_some() {
            return Ok(());
        }
        self.result_cache.record(result.worker_id.as_str(), &key, true);
        Ok(())
    }

    async fn send_heartbeat(&self, _heartbeat: HeartbeatReport) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_log(&self, _line: LogLine) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_log_batch(&self, _lines: Vec<LogLine>) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_log_chunk(&self, _chunk: LogChunk) -> Result<(), TransportError> {
        Ok(())
    }

    async fn poll_control(
        &self,
        worker_id: &WorkerId,
        _timeout: Duration,
    ) -> Result<Option<ControlEnvelope>, TransportError> {
        let mut queues = self.queues.lock();
        let Some(queue) = queues.controls.get_mut(worker_id) else {
            return Ok(None);
        };
        Ok(queue.pop_front())
    }

    async fn ack_control(&self, worker_id: &WorkerId, receipt_id: &str) -> Result<(), TransportError> {
        self.ack_task(worker_id, receipt_id)
    }

    async fn push_control(&self, worker: &Worker, envelope: ControlEnvelope) -> Result<(), TransportError> {
        let mut queues = self.queues.lock();
        queues.controls.entry(worker.id).or_default().push_back(envelope);
        Ok(())
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
