// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context, Result};
use grid_core::ProjectId;
use grid_wire::ipc::Request;
use std::path::PathBuf;

use crate::client::DaemonClient;
use crate::output::{print_payload, OutputFormat};

pub async fn edit(project_id: ProjectId, archive: PathBuf, format: OutputFormat) -> Result<()> {
    let zip = std::fs::read(&archive).with_context(|| format!("reading {}", archive.display()))?;
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::EditDraft { project_id, zip }).await?;
    print_payload(format, &payload)
}

pub async fn publish(project_id: ProjectId, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::PublishProject { project_id }).await?;
    print_payload(format, &payload)
}

pub async fn manifest(project_id: ProjectId, version: Option<u32>, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let payload = client.call(Request::GetProjectManifest { project_id, version }).await?;
    print_payload(format, &payload)
}
