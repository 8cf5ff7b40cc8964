// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the same paths `gridd` resolves, so `grid` finds the daemon it's
//! actually talking to without needing a shared config file.

use std::path::PathBuf;

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

pub fn ipc_socket_path() -> PathBuf {
    std::env::var("GRID_IPC_SOCKET").map(PathBuf::from).unwrap_or_else(|_| state_dir().join("gridd.sock"))
}
