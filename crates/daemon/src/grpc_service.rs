// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway-mode gRPC surface (spec §6 "Worker transport (Gateway mode)"):
//! the `GatewayService` a polling Worker talks to, backed by
//! [`grid_transport::GatewayTransport`]'s in-process queues for the
//! pull/ack RPCs and by [`crate::ingest`] for everything else, so a Worker
//! sees identical domain effects regardless of which transport mode dialed
//! in (spec §4.7 "Shared contract").

use crate::error::IngestError;
use crate::ingest;
use crate::state::AppState;
use grid_transport::{HeartbeatReport, LogChunk, LogLine, LogStreamKind, ResultReport};
use grid_wire::grpc::gateway_service_server::GatewayService;
use grid_wire::grpc::*;
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct GatewayServiceImpl {
    state: Arc<AppState>,
}

impl GatewayServiceImpl {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn gateway(&self) -> Result<&Arc<grid_transport::GatewayTransport>, Status> {
        self.state.gateway.as_ref().ok_or_else(|| Status::failed_precondition("not running in gateway mode"))
    }
}

fn stream_name(kind: LogStreamKind) -> &'static str {
    match kind {
        LogStreamKind::Stdout => "stdout",
        LogStreamKind::Stderr => "stderr",
        LogStreamKind::System => "system",
    }
}

fn parse_stream(name: &str) -> LogStreamKind {
    match name {
        "stderr" => LogStreamKind::Stderr,
        "system" => LogStreamKind::System,
        _ => LogStreamKind::Stdout,
    }
}

#[async_trait::async_trait]
impl GatewayService for GatewayServiceImpl {
    async fn poll_task(&self, request: Request<PollTaskRequest>) -> Result<Response<PollTaskResponse>, Status> {
        let req = request.into_inner();
        let worker_id = req.worker_id.into();
        let Some((payload, receipt_id)) = self.gateway()?.poll_task(&worker_id) else {
            return Ok(Response::new(PollTaskResponse { has_task: false, task: None, receipt_id: String::new() }));
        };
        let task = TaskPayload {
            task_id: payload.task_id.to_string(),
            project_id: payload.project_ref,
            entry_point: payload.entry_point,
            task_type: payload.task_type,
            timeout_seconds: payload.timeout_seconds,
            payload_json: payload.payload.to_string(),
        };
        Ok(Response::new(PollTaskResponse { has_task: true, task: Some(task), receipt_id }))
    }

    async fn ack_task(&self, request: Request<AckTaskRequest>) -> Result<Response<AckTaskResponse>, Status> {
        let req = request.into_inner();
        let worker_id = req.worker_id.into();
        self.gateway()?.ack_task(&worker_id, &req.receipt_id).map_err(IngestError::from)?;
        Ok(Response::new(AckTaskResponse { success: true }))
    }

    async fn report_result(
        &self,
        request: Request<ReportResultRequest>,
    ) -> Result<Response<ReportResultResponse>, Status> {
        let req = request.into_inner();
        let report = ResultReport {
            worker_id: req.worker_id.into(),
            task_id: req.task_id.into(),
            status: req.status,
            exit_code: req.exit_code,
            started_at_ms: req.started_at,
            finished_at_ms: req.finished_at,
            duration_ms: req.duration_ms,
            data: req.data_json.and_then(|s| serde_json::from_str(&s).ok()),
        };
        match ingest::apply_result(&self.state, report).await {
            Ok(()) => Ok(Response::new(ReportResultResponse { success: true, error: None })),
            Err(e) => Ok(Response::new(ReportResultResponse { success: false, error: Some(e.to_string()) })),
        }
    }

    async fn send_log(&self, request: Request<SendLogRequest>) -> Result<Response<SendLogResponse>, Status> {
        let log = request.into_inner().log.ok_or_else(|| Status::invalid_argument("missing log"))?;
        let line = LogLine {
            run_id: log.run_id,
            stream: parse_stream(&log.stream),
            sequence: log.sequence,
            timestamp_ms: log.timestamp,
            level: log.level,
            content: log.content,
            source: log.source,
        };
        ingest::apply_log_line(&self.state, line).await.map_err(Status::from)?;
        Ok(Response::new(SendLogResponse { success: true }))
    }

    async fn send_log_batch(
        &self,
        request: Request<SendLogBatchRequest>,
    ) -> Result<Response<SendLogResponse>, Status> {
        let lines = request
            .into_inner()
            .logs
            .into_iter()
            .map(|log| LogLine {
                run_id: log.run_id,
                stream: parse_stream(&log.stream),
                sequence: log.sequence,
                timestamp_ms: log.timestamp,
                level: log.level,
                content: log.content,
                source: log.source,
            })
            .collect();
        ingest::apply_log_batch(&self.state, lines).await.map_err(Status::from)?;
        Ok(Response::new(SendLogResponse { success: true }))
    }

    async fn send_log_chunk(
        &self,
        request: Request<SendLogChunkRequest>,
    ) -> Result<Response<SendLogResponse>, Status> {
        let req = request.into_inner();
        let chunk = LogChunk {
            run_id: req.run_id,
            stream: parse_stream(&req.log_type),
            data: req.data,
            offset: req.offset,
            is_final: req.is_final,
            total_size: req.total_size,
            checksum: req.checksum,
        };
        ingest::apply_log_chunk(&self.state, chunk).await.map_err(Status::from)?;
        Ok(Response::new(SendLogResponse { success: true }))
    }

    async fn send_heartbeat(
        &self,
        request: Request<SendHeartbeatRequest>,
    ) -> Result<Response<SendHeartbeatResponse>, Status> {
        let req = request.into_inner();
        let report = HeartbeatReport {
            worker_id: req.worker_id.into(),
            status: req.status,
            cpu_percent: req.cpu_percent,
            memory_percent: req.memory_percent,
            disk_percent: req.disk_percent,
            running_tasks: req.running_tasks,
            max_concurrent_tasks: req.max_concurrent_tasks,
            timestamp_ms: req.timestamp,
            os_info: req.os_info,
            capabilities: req.capabilities_json.and_then(|s| serde_json::from_str(&s).ok()),
        };
        ingest::apply_heartbeat(&self.state, report).await.map_err(Status::from)?;
        Ok(Response::new(SendHeartbeatResponse { success: true }))
    }

    async fn poll_control(
        &self,
        request: Request<PollControlRequest>,
    ) -> Result<Response<PollControlResponse>, Status> {
        let req = request.into_inner();
        let worker_id = req.worker_id.into();
        let timeout = std::time::Duration::from_millis(req.timeout_ms);
        let envelope = grid_transport::Transport::poll_control(self.state.transport.as_ref(), &worker_id, timeout)
            .await
            .map_err(IngestError::from)?;
        let Some(envelope) = envelope else {
            return Ok(Response::new(PollControlResponse { has_control: false, control: None, receipt_id: String::new() }));
        };
        let control = ControlMessage {
            control_type: envelope.control_type,
            request_id: envelope.request_id,
            task_id: envelope.task_id.map(|id| id.to_string()).unwrap_or_default(),
            run_id: envelope.run_id,
            reason: envelope.reason,
            payload_json: envelope.payload.map(|v| v.to_string()),
        };
        Ok(Response::new(PollControlResponse { has_control: true, control: Some(control), receipt_id: envelope.receipt_id }))
    }

    async fn ack_control(&self, request: Request<AckControlRequest>) -> Result<Response<AckControlResponse>, Status> {
        let req = request.into_inner();
        let worker_id = req.worker_id.into();
        grid_transport::Transport::ack_control(self.state.transport.as_ref(), &worker_id, &req.receipt_id)
            .await
            .map_err(IngestError::from)?;
        Ok(Response::new(AckControlResponse { success: true }))
    }

    async fn report_control_result(
        &self,
        request: Request<ReportControlResultRequest>,
    ) -> Result<Response<ReportControlResultResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(
            worker_id = %req.worker_id,
            request_id = %req.request_id,
            success = req.success,
            "control result acknowledged"
        );
        Ok(Response::new(ReportControlResultResponse { success: true }))
    }
}

#[cfg(test)]
#[path = "grpc_service_tests.rs"]
mod tests;
