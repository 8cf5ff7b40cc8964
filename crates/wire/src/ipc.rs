// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local control-socket IPC between `grid` (operator CLI) and `gridd` (the
//! Master daemon): role promotion/demotion, ad-hoc task/worker/run
//! inspection, and daemon lifecycle queries that don't warrant a full
//! Gateway RPC round trip.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

use grid_core::{ProjectId, RunId, TaskId, WorkerId};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const MAX_MESSAGE_LEN: u32 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("message of {0} bytes exceeds the {MAX_MESSAGE_LEN} byte limit")]
    TooLarge(u32),
    #[error("connection closed before a full message was read")]
    Truncated,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Status,
    PromoteRole,
    DemoteRole,
    GetTask { task_id: TaskId },
    GetRun { run_id: RunId },
    GetWorker { worker_id: WorkerId },
    TriggerTask { task_id: TaskId },
    CancelRun { run_id: RunId, reason: String },
    EditDraft { project_id: ProjectId, zip: Vec<u8> },
    PublishProject { project_id: ProjectId },
    GetProjectManifest { project_id: ProjectId, version: Option<u32> },
    GetProjectFile { project_id: ProjectId, version: u32, path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Ok { payload: serde_json::Value },
    Error { message: String },
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, IpcError> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, IpcError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub async fn write_message<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    value: &T,
) -> Result<(), IpcError> {
    let body = encode(value)?;
    let len = u32::try_from(body.len()).map_err(|_| IpcError::TooLarge(u32::MAX))?;
    if len > MAX_MESSAGE_LEN {
        return Err(IpcError::TooLarge(len));
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R: AsyncRead + Unpin, T: for<'de> Deserialize<'de>>(
    reader: &mut R,
) -> Result<T, IpcError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(IpcError::Truncated),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_LEN {
        return Err(IpcError::TooLarge(len));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            IpcError::Truncated
        } else {
            IpcError::Io(e)
        }
    })?;
    decode(&body)
}

#[cfg(test)]
#[path = "ipc_tests.rs"]
mod tests;
