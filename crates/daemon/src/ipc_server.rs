// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local control-socket listener for the `grid` operator CLI (spec §6
//! "Operator interface"). One connection per request-response round trip,
//! framed per [`grid_wire::ipc`].

use crate::state::{AppState, SchedulerHandle};
use grid_storage::{RunStore, TaskStore, WorkerStore};
use grid_wire::ipc::{read_message, write_message, IpcError, Request, Response};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};

pub async fn serve(state: Arc<AppState>, socket_path: &std::path::Path) -> std::io::Result<()> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    tracing::info!(path = %socket_path.display(), "ipc control socket listening");

    loop {
        let (stream, _addr) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(state, stream).await {
                tracing::warn!(error = %e, "ipc connection ended with an error");
            }
        });
    }
}

async fn handle_connection(state: Arc<AppState>, mut stream: UnixStream) -> Result<(), IpcError> {
    let request: Request = read_message(&mut stream).await?;
    let response = handle_request(&state, request).await;
    write_message(&mut stream, &response).await
}

async fn handle_request(state: &AppState, request: Request) -> Response {
    match dispatch(state, request).await {
        Ok(payload) => Response::Ok { payload },
        Err(message) => Response::Error { message },
    }
}

async fn dispatch(state: &AppState, request: Request) -> Result<serde_json::Value, String> {
    match request {
        Request::Status => Ok(serde_json::json!({
            "role": match state.scheduler {
                SchedulerHandle::Master(_) => "master",
                SchedulerHandle::Control(_) => "control",
            },
            "http_addr": state.config.http_addr,
            "grpc_addr": state.config.grpc_addr,
        })),
        Request::PromoteRole | Request::DemoteRole => {
            // Spec §4.10 "Scheduler role: configuration, not election" — the
            // role is fixed at process start; promotion/demotion is a
            // restart-with-new-config operation, not a live toggle.
            Err("scheduler role is fixed at daemon startup; update the config and restart".to_string())
        }
        Request::GetTask { task_id } => {
            let task = TaskStore::get(state.store.as_ref(), &task_id).await.map_err(|e| e.to_string())?;
            serde_json::to_value(task).map_err(|e| e.to_string())
        }
        Request::GetRun { run_id } => {
            let run = RunStore::get(state.store.as_ref(), &run_id).await.map_err(|e| e.to_string())?;
            serde_json::to_value(run).map_err(|e| e.to_string())
        }
        Request::GetWorker { worker_id } => {
            let worker = WorkerStore::get(state.store.as_ref(), &worker_id).await.map_err(|e| e.to_string())?;
            serde_json::to_value(worker).map_err(|e| e.to_string())
        }
        Request::TriggerTask { task_id } => {
            let master = state.master().ok_or("not running in master role")?;
            let outcome = master.fire(task_id).await.map_err(|e| e.to_string())?;
            serde_json::to_value(format!("{outcome:?}")).map_err(|e| e.to_string())
        }
        Request::CancelRun { run_id, reason } => {
            let master = state.master().ok_or("not running in master role")?;
            master.cancel(run_id, reason).await.map_err(|e| e.to_string())?;
            Ok(serde_json::json!({"cancelled": true}))
        }
        Request::EditDraft { project_id, zip } => {
            state
                .artifacts
                .edit_draft(state.store.as_ref(), state.store.as_ref(), &project_id, zip)
                .await
                .map_err(|e| e.to_string())?;
            Ok(serde_json::json!({"edited": true}))
        }
        Request::PublishProject { project_id } => {
            let manifest = state.artifacts.publish_version(&project_id).await.map_err(|e| e.to_string())?;
            serde_json::to_value(manifest).map_err(|e| e.to_string())
        }
        Request::GetProjectManifest { project_id, version } => {
            let selector = match version {
                Some(v) => grid_storage::VersionSelector::Exact(v),
                None => grid_storage::VersionSelector::Latest,
            };
            let manifest = state.artifacts.read_manifest(&project_id, selector).await.map_err(|e| e.to_string())?;
            serde_json::to_value(manifest).map_err(|e| e.to_string())
        }
        Request::GetProjectFile { project_id, version, path } => {
            let bytes = state.artifacts.read_member(&project_id, version, &path).await.map_err(|e| e.to_string())?;
            serde_json::to_value(bytes).map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "ipc_server_tests.rs"]
mod tests;
