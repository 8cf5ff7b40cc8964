// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use grid_core::RunId;
use grid_wire::ipc::Request;

use crate::client::DaemonClient;
use crate::output::{print_payload, OutputFormat};

pub async fn get(run_id: RunId, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::GetRun { run_id }).await?;
    print_payload(format, &payload)
}

pub async fn cancel(run_id: RunId, reason: String, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::CancelRun { run_id, reason }).await?;
    print_payload(format, &payload)
}
