// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use grid_core::WorkerId;
use grid_wire::ipc::Request;

use crate::client::DaemonClient;
use crate::output::{print_payload, OutputFormat};

pub async fn get(worker_id: WorkerId, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::GetWorker { worker_id }).await?;
    print_payload(format, &payload)
}
