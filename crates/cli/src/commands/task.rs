// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use grid_core::TaskId;
use grid_wire::ipc::Request;

use crate::client::DaemonClient;
use crate::output::{print_payload, OutputFormat};

pub async fn get(task_id: TaskId, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::GetTask { task_id }).await?;
    print_payload(format, &payload)
}

pub async fn trigger(task_id: TaskId, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::TriggerTask { task_id }).await?;
    print_payload(format, &payload)
}
