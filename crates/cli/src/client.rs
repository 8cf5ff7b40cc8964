// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client for `gridd`'s local IPC control socket (spec §6 "Operator
//! interface"): one connection per round trip, framed per [`grid_wire::ipc`].

use anyhow::{bail, Context, Result};
use grid_wire::ipc::{read_message, write_message, Request, Response};
use tokio::net::UnixStream;

pub struct DaemonClient {
    socket_path: std::path::PathBuf,
}

impl DaemonClient {
    pub fn connect() -> Result<Self> {
        let socket_path = crate::env::ipc_socket_path();
        if !socket_path.exists() {
            bail!("gridd is not running (no socket at {})", socket_path.display());
        }
        Ok(Self { socket_path })
    }

    pub async fn call(&self, request: Request) -> Result<serde_json::Value> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .with_context(|| format!("connecting to {}", self.socket_path.display()))?;
        write_message(&mut stream, &request).await.context("sending request")?;
        let response: Response = read_message(&mut stream).await.context("reading response")?;
        match response {
            Response::Ok { payload } => Ok(payload),
            Response::Error { message } => bail!(message),
        }
    }
}
