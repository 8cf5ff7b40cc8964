// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a control-socket payload either as pretty JSON or, for text mode,
/// the same JSON compacted into a single line — the daemon's payloads are
/// already structured records, not prose, so text mode doesn't reformat them.
pub fn print_payload(format: OutputFormat, payload: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
        OutputFormat::Text => println!("{payload}"),
    }
    Ok(())
}
