// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared ingestion logic for Worker pushes (spec §4.7, §4.8, §4.9): applying
//! a reported result to a Run, feeding the Node Registry from a heartbeat,
//! and appending log lines/chunks to the Log Pipeline with an echo to the
//! WebSocket Hub. Both the Intranet HTTP handlers and the Gateway gRPC
//! service call into this module so the two transport modes never diverge
//! in what a push actually does to stored state.

use crate::error::IngestError;
use crate::state::AppState;
use grid_core::{Transition, WorkerMetrics, WorkerStatus};
use grid_storage::{LogRecord, LogStream, RunStore, TaskStore, WorkerStore};
use grid_transport::{HeartbeatReport, LogChunk, LogLine, LogStreamKind, ResultReport};
use grid_wire::ws::{LogLineData, WsMessage};

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Apply a Worker's terminal result to the Run it belongs to (spec §4.9
/// "Runtime axis: running -> success/failed"), then roll the outcome up into
/// the Task's counters (spec §3 "Task" `record_success`/`record_failure`).
///
/// [`ResultReport`] names only the Task, not the Run, so the in-flight Run
/// dispatched for it is resolved by scanning `list_for_task` for the one
/// non-terminal attempt — the same assumption `fire`'s one-dispatch-at-a-time
/// concurrency gate makes (spec §8 invariant 8).
///
/// A Worker retrying a push after a network timeout (spec §8 scenario B) will
/// report the same outcome for a Run that's already terminal. When nothing
/// non-terminal is left for the task, the most recent Run is checked against
/// the report: a matching outcome is a duplicate and is accepted as a no-op
/// rather than rolling the Task's counters a second time.
pub async fn apply_result(state: &AppState, report: ResultReport) -> Result<(), IngestError> {
    state.transport.report_result(report.clone()).await?;

    let mut runs = RunStore::list_for_task(state.store.as_ref(), &report.task_id).await?;
    let mut run = match runs.iter().position(|r| !r.status.is_terminal()) {
        Some(index) => runs.swap_remove(index),
        None => {
            let succeeded = report.status == "success";
            let already_applied = runs.iter().any(|r| match &r.status {
                grid_core::ExecutionStatus::Success => succeeded,
                grid_core::ExecutionStatus::Failed(_) => !succeeded,
                _ => false,
            });
            if already_applied {
                tracing::debug!(task_id = %report.task_id, "duplicate result report for a terminal run, ignoring");
                return Ok(());
            }
            return Err(
                grid_storage::StorageError::NotFound(format!("in-flight run for task {}", report.task_id)).into()
            );
        }
    };
    let run_id = run.id;
    let succeeded = report.status == "success";
    let transition =
        if succeeded { Transition::RuntimeSucceeded } else { Transition::RuntimeFailed(report.status.clone().into()) };
    run.exit_code = report.exit_code;
    run.result_data = report.data.clone();
    run.apply(transition, report.finished_at_ms)?;
    let task_ref = run.task_ref;
    RunStore::put(state.store.as_ref(), run).await?;

    let mut task = TaskStore::get(state.store.as_ref(), &task_ref).await?;
    if succeeded {
        task.record_success(report.finished_at_ms);
    } else {
        task.record_failure(report.finished_at_ms);
    }
    TaskStore::put(state.store.as_ref(), task).await?;

    state.hub.publish(
        &run_id.to_string(),
        WsMessage::ExecutionStatus {
            execution_id: run_id.to_string(),
            data: grid_wire::ws::ExecutionStatusData {
                status: report.status.clone(),
                progress: None,
                message: None,
            },
            timestamp: now_ms(),
        },
    );
    drain_soon(state, run_id.to_string());

    Ok(())
}

/// Feed a heartbeat into the Node Registry and persist the Worker's latest
/// metrics (spec §4.8 "Heartbeat ingest").
pub async fn apply_heartbeat(state: &AppState, report: HeartbeatReport) -> Result<(), IngestError> {
    state.transport.send_heartbeat(report.clone()).await?;

    let metrics = WorkerMetrics {
        cpu_percent: report.cpu_percent,
        memory_percent: report.memory_percent,
        disk_percent: report.disk_percent,
        running_tasks: report.running_tasks,
        max_concurrent_tasks: report.max_concurrent_tasks,
    };
    let now = report.timestamp_ms;
    state.health.observe_heartbeat(report.worker_id, now, metrics.clone());

    let mut worker = WorkerStore::get(state.store.as_ref(), &report.worker_id).await?;
    worker.status = WorkerStatus::Online;
    worker.last_heartbeat_ms = Some(now);
    worker.metrics = Some(metrics);
    WorkerStore::put(state.store.as_ref(), worker).await?;
    Ok(())
}

/// Append one log line, durably, and echo it to any subscriber on the Hub
/// (spec §4.5 "Each durable append is echoed to C6").
pub async fn apply_log_line(state: &AppState, line: LogLine) -> Result<(), IngestError> {
    state.transport.send_log(line.clone()).await?;
    append_and_echo(state, line).await
}

pub async fn apply_log_batch(state: &AppState, lines: Vec<LogLine>) -> Result<(), IngestError> {
    state.transport.send_log_batch(lines.clone()).await?;
    for line in lines {
        append_and_echo(state, line).await?;
    }
    Ok(())
}

async fn append_and_echo(state: &AppState, line: LogLine) -> Result<(), IngestError> {
    let stream = match line.stream {
        LogStreamKind::Stdout => LogStream::Stdout,
        LogStreamKind::Stderr => LogStream::Stderr,
        LogStreamKind::System => LogStream::System,
    };
    let record = LogRecord {
        sequence: line.sequence,
        timestamp_ms: line.timestamp_ms,
        level: line.level.clone(),
        content: line.content.clone(),
        source: line.source.clone(),
    };
    state.log_pipeline.submit_line(&line.run_id, stream, record).await?;

    state.hub.publish(
        &line.run_id,
        WsMessage::LogLine {
            execution_id: line.run_id.clone(),
            data: LogLineData {
                execution_id: line.run_id.clone(),
                log_type: stream.to_string(),
                content: line.content,
                timestamp: line.timestamp_ms,
                level: line.level,
                source: line.source,
            },
            timestamp: line.timestamp_ms,
        },
    );
    drain_soon(state, line.run_id);
    Ok(())
}

pub async fn apply_log_chunk(state: &AppState, chunk: LogChunk) -> Result<(), IngestError> {
    state.transport.send_log_chunk(chunk.clone()).await?;
    let stream = match chunk.stream {
        LogStreamKind::Stdout => LogStream::Stdout,
        LogStreamKind::Stderr => LogStream::Stderr,
        LogStreamKind::System => LogStream::System,
    };
    state
        .log_pipeline
        .submit_chunk(&chunk.run_id, stream, chunk.data, chunk.offset, chunk.is_final, chunk.total_size, chunk.checksum)
        .await?;
    Ok(())
}

/// Fan out anything queued for `execution_id` without blocking the caller's
/// response (spec §4.6 "Message fan-out path" runs off the ingestion path).
fn drain_soon(state: &AppState, execution_id: String) {
    let hub = state.hub.clone();
    tokio::spawn(async move {
        hub.drain_batch(&execution_id).await;
    });
}
