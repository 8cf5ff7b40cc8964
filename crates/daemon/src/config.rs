// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gridd` configuration: TOML file on disk, overridden layer-by-layer by
//! `GRID_*` environment variables (spec §6 "External interfaces").

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerRole {
    Master,
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Intranet,
    Gateway,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub role: SchedulerRole,
    pub transport_mode: TransportMode,
    pub http_addr: String,
    pub grpc_addr: String,
    pub ws_addr: String,
    pub object_store_root: String,
    pub max_concurrent_tasks: usize,
    pub ack_timeout_ms: u64,
    pub dispatch_stall_limit_secs: u64,
    pub run_heartbeat_limit_secs: u64,
    pub t_offline_secs: u64,
    pub control_bus_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            role: SchedulerRole::Master,
            transport_mode: TransportMode::Intranet,
            http_addr: "0.0.0.0:8080".to_string(),
            grpc_addr: "0.0.0.0:8081".to_string(),
            ws_addr: "0.0.0.0:8082".to_string(),
            object_store_root: "./data/objects".to_string(),
            max_concurrent_tasks: 64,
            ack_timeout_ms: 5_000,
            dispatch_stall_limit_secs: 120,
            run_heartbeat_limit_secs: 90,
            t_offline_secs: 30,
            control_bus_capacity: 10_000,
        }
    }
}

impl Config {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn dispatch_stall_limit(&self) -> Duration {
        Duration::from_secs(self.dispatch_stall_limit_secs)
    }

    pub fn run_heartbeat_limit(&self) -> Duration {
        Duration::from_secs(self.run_heartbeat_limit_secs)
    }

    pub fn t_offline(&self) -> Duration {
        Duration::from_secs(self.t_offline_secs)
    }

    /// Loads `path` if present, falling back to defaults, then applies
    /// `GRID_*` environment overrides (env wins — spec §6 layering).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GRID_ROLE") {
            self.role = match v.as_str() {
                "control" => SchedulerRole::Control,
                _ => SchedulerRole::Master,
            };
        }
        if let Ok(v) = std::env::var("GRID_TRANSPORT_MODE") {
            self.transport_mode = match v.as_str() {
                "gateway" => TransportMode::Gateway,
                _ => TransportMode::Intranet,
            };
        }
        if let Ok(v) = std::env::var("GRID_HTTP_ADDR") {
            self.http_addr = v;
        }
        if let Ok(v) = std::env::var("GRID_GRPC_ADDR") {
            self.grpc_addr = v;
        }
        if let Ok(v) = std::env::var("GRID_WS_ADDR") {
            self.ws_addr = v;
        }
        if let Ok(v) = std::env::var("GRID_OBJECT_STORE_ROOT") {
            self.object_store_root = v;
        }
        if let Ok(Ok(v)) = std::env::var("GRID_MAX_CONCURRENT_TASKS").map(|s| s.parse()) {
            self.max_concurrent_tasks = v;
        }
        if let Ok(Ok(v)) = std::env::var("GRID_ACK_TIMEOUT_MS").map(|s| s.parse()) {
            self.ack_timeout_ms = v;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
