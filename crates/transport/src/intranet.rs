// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intranet transport (spec §4.7, Intranet mode): Master reaches directly
//! into the Worker's `host:port`, synchronously signing and pushing the
//! dispatch over HTTP and waiting for `TaskAck` within `ack_timeout`.
//! `report_result`/`send_heartbeat`/`send_log*` model the frames the Worker
//! pushes back over that same logical connection — in this single-process
//! implementation they are the ingestion point a `gridd` HTTP handler calls
//! after receiving the Worker's push, recorded idempotently via the Receipt
//! Cache exactly as the Gateway mode's unary RPCs are.

use crate::auth::AuthScheme;
use crate::error::TransportError;
use crate::transport::{
    ControlEnvelope, DispatchOutcome, HeartbeatReport, LogChunk, LogLine, ResultReport, TaskPayload, Transport,
};
use async_trait::async_trait;
use grid_core::{ReceiptCache, Worker, WorkerId};
use std::time::Duration;

pub struct IntranetTransport {
    client: reqwest::Client,
    auth: AuthScheme,
    result_cache: ReceiptCache<bool>,
}

impl IntranetTransport {
    pub fn new(auth: AuthScheme) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            result_cache: ReceiptCache::new(Duration::from_secs(600)),
        }
    }
}

#[async_trait]
impl Transport for IntranetTransport {
    async fn dispatch(
        &self,
        worker: &Worker,
        task: TaskPayload,
        ack_timeout: Duration,
    ) -> Result<DispatchOutcome, TransportError> {
        let url = format!("http://{}:{}/api/v1/tasks/dispatch", worker.host, worker.port);
        let body = serde_json::to_value(&task).map_err(|e| TransportError::Internal(e.to_string()))?;
        let headers = self.auth.headers_for(&body)?;

        let mut request = self.client.post(&url).json(&body);
        for (name, value) in headers.0 {
            request = request.header(name, value);
        }

        let response = tokio::time::timeout(ack_timeout, request.send())
            .await
            .map_err(|_| TransportError::AckTimeout)?
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TransportError::AuthFailed(format!("worker {} rejected credentials", worker.id)));
        }
        if !response.status().is_success() {
            return Err(TransportError::Rejected(format!("status {}", response.status())));
        }

        response.json::<DispatchOutcome>().await.map_err(|e| TransportError::Internal(e.to_string()))
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

    /// Control in Intranet mode is a Master-initiated push on the bidi
    /// stream, not a Worker pull — there is nothing for this Worker to poll.
    async fn poll_control(
        &self,
        _worker_id: &WorkerId,
        _timeout: Duration,
    ) -> Result<Option<ControlEnvelope>, TransportError> {
        Ok(None)
    }

    async fn ack_control(&self, _worker_id: &WorkerId, _receipt_id: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn push_control(&self, worker: &Worker, envelope: ControlEnvelope) -> Result<(), TransportError> {
        let url = format!("http://{}:{}/api/v1/tasks/control", worker.host, worker.port);
        let body = serde_json::to_value(&envelope).map_err(|e| TransportError::Internal(e.to_string()))?;
        let headers = self.auth.headers_for(&body)?;

        let mut request = self.client.post(&url).json(&body);
        for (name, value) in headers.0 {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| TransportError::Connection(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::Rejected(format!("status {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "intranet_tests.rs"]
mod tests;
