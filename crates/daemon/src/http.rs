// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intranet-mode HTTP surface (spec §6 "Worker transport (Intranet mode)"):
//! the inbound half of [`grid_transport::IntranetTransport`] — a Worker
//! pushes its result/heartbeat/log frames here after `gridd` pushed it a
//! task over the same transport's `dispatch`/`push_control`.

use crate::auth;
use crate::error::IngestError;
use crate::ingest;
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use grid_storage::WorkerStore;
use grid_transport::{ControlEnvelope, HeartbeatReport, LogChunk, LogLine, ResultReport};
use serde::Serialize;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    let hub = state.hub.clone();
    Router::new()
        .route("/api/v1/tasks/result", post(report_result))
        .route("/api/v1/workers/heartbeat", post(send_heartbeat))
        .route("/api/v1/logs/line", post(send_log))
        .route("/api/v1/logs/batch", post(send_log_batch))
        .route("/api/v1/logs/chunk", post(send_log_chunk))
        .route("/api/v1/tasks/control/result", post(report_control_result))
        .with_state(state)
        .merge(grid_ws::router(hub))
}

async fn authenticated<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    worker_id: &grid_core::WorkerId,
    body: &T,
) -> Result<(), IngestError> {
    let payload = serde_json::to_value(body).map_err(|e| IngestError::Unauthorized(e.to_string()))?;
    auth::authenticate(state.store.as_ref() as &dyn WorkerStore, worker_id, headers, &payload).await?;
    Ok(())
}

async fn report_result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ResultReport>,
) -> Result<(), IngestError> {
    authenticated(&state, &headers, &body.worker_id, &body).await?;
    ingest::apply_result(&state, body).await
}

async fn send_heartbeat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<HeartbeatReport>,
) -> Result<(), IngestError> {
    authenticated(&state, &headers, &body.worker_id, &body).await?;
    ingest::apply_heartbeat(&state, body).await
}

async fn send_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<LogLineRequest>,
) -> Result<(), IngestError> {
    authenticated(&state, &headers, &body.worker_id, &body).await?;
    ingest::apply_log_line(&state, body.line).await
}

async fn send_log_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<LogBatchRequest>,
) -> Result<(), IngestError> {
    authenticated(&state, &headers, &body.worker_id, &body).await?;
    ingest::apply_log_batch(&state, body.lines).await
}

async fn send_log_chunk(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<LogChunkRequest>,
) -> Result<(), IngestError> {
    authenticated(&state, &headers, &body.worker_id, &body).await?;
    ingest::apply_log_chunk(&state, body.chunk).await
}

/// A Worker's acknowledgement of a Master-pushed control message (spec §4.7
/// table, Intranet column: no poll, so the ack arrives as this push instead
/// of `AckControl`).
async fn report_control_result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ControlResultRequest>,
) -> Result<(), IngestError> {
    authenticated(&state, &headers, &body.worker_id, &body).await?;
    tracing::debug!(
        worker_id = %body.worker_id,
        request_id = %body.envelope.request_id,
        control_type = %body.envelope.control_type,
        "control result acknowledged"
    );
    Ok(())
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct LogLineRequest {
    worker_id: grid_core::WorkerId,
    #[serde(flatten)]
    line: LogLine,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct LogBatchRequest {
    worker_id: grid_core::WorkerId,
    lines: Vec<LogLine>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct LogChunkRequest {
    worker_id: grid_core::WorkerId,
    #[serde(flatten)]
    chunk: LogChunk,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ControlResultRequest {
    worker_id: grid_core::WorkerId,
    envelope: ControlEnvelope,
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
