// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the daemon's state directory: `GRID_STATE_DIR` > `XDG_STATE_HOME/grid` > `~/.local/state/grid`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GRID_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("grid");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local/state/grid")
}

/// Path to the daemon's TOML config file, defaulting under `state_dir()`.
pub fn config_path() -> PathBuf {
    std::env::var("GRID_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| state_dir().join("gridd.toml"))
}

/// Local IPC control-socket path for the `grid` CLI.
pub fn ipc_socket_path() -> PathBuf {
    std::env::var("GRID_IPC_SOCKET").map(PathBuf::from).unwrap_or_else(|_| state_dir().join("gridd.sock"))
}

pub fn ipc_timeout() -> Duration {
    std::env::var("GRID_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Shutdown drain timeout (default 5s, overridable via `GRID_DRAIN_TIMEOUT_MS`).
pub fn drain_timeout() -> Duration {
    std::env::var("GRID_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}
