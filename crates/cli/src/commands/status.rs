// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use anyhow::Result;
use grid_wire::ipc::Request;

use crate::client::DaemonClient;
use crate::output::{print_payload, OutputFormat};

pub async fn handle(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => {
            println!("gridd is not running");
            return Ok(());
        }
    };
    let payload = client.call(Request::Status).await?;
    print_payload(format, &payload)
}
