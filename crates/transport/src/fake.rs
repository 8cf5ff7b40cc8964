// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`Transport`] double for other crates' tests (spec §4.7).
//! Every call is recorded and dispatch outcomes are scriptable, so callers
//! (the Scheduler) can assert on exactly what was sent without standing up
//! a real HTTP or gRPC endpoint.

use crate::error::TransportError;
use crate::transport::{
    ControlEnvelope, DispatchOutcome, HeartbeatReport, LogChunk, LogLine, ResultReport, TaskPayload, Transport,
};
use async_trait::async_trait;
use grid_core::{Worker, WorkerId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Default)]
pub struct FakeTransport {
    pub dispatched: Mutex<Vec<(WorkerId, TaskPayload)>>,
    pub results: Mutex<Vec<ResultReport>>,
    pub heartbeats: Mutex<Vec<HeartbeatReport>>,
    pub next_outcome: Mutex<Option<Result<DispatchOutcome, TransportError>>>,
    pub pending_controls: Mutex<VecDeque<(WorkerId, ControlEnvelope)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result of the next `dispatch()` call.
    pub fn set_next_outcome(&self, outcome: Result<DispatchOutcome, TransportError>) {
        *self.next_outcome.lock() = Some(outcome);
    }

    pub fn push_control(&self, worker_id: WorkerId, envelope: ControlEnvelope) {
        self.pending_controls.lock().push_back((worker_id, envelope));
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn dispatch(
        &self,
        worker: &Worker,
        task: TaskPayload,
        _ack_timeout: Duration,
    ) -> Result<DispatchOutcome, TransportError> {
        let task_id = task.task_id;
        self.dispatched.lock().push((worker.id, task));
        match self.next_outcome.lock().take() {
            Some(scripted) => scripted,
            None => Ok(DispatchOutcome { accepted: true, reason: None, task_id }),
        }
    }

    async fn report_result(&self, result: ResultReport) -> Result<(), TransportError> {
        self.results.lock().push(result);
        Ok(())
    }

    async fn send_heartbeat(&self, heartbeat: HeartbeatReport) -> Result<(), TransportError> {
        self.heartbeats.lock().push(heartbeat);
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
        let mut queue = self.pending_controls.lock();
        let index = queue.iter().position(|(w, _)| w == worker_id);
        Ok(index.and_then(|i| queue.remove(i)).map(|(_, envelope)| envelope))
    }

    async fn ack_control(&self, _worker_id: &WorkerId, _receipt_id: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn push_control(&self, worker: &Worker, envelope: ControlEnvelope) -> Result<(), TransportError> {
        self.pending_controls.lock().push_back((worker.id, envelope));
        Ok(())
    }
}
