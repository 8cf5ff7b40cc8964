// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity, registration record, and lifecycle state (spec §3 "Worker").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a registered Worker.
    pub struct WorkerId("wkr-");
}

/// Worker lifecycle status, driven by the Node Registry & Health component
/// (C8). See the transition diagram in spec §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Offline,
    Online,
    Unreachable,
}

crate::simple_display! {
    WorkerStatus {
        Offline => "offline",
        Online => "online",
        Unreachable => "unreachable",
    }
}

/// Point-in-time resource/throughput snapshot reported on every heartbeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerMetrics {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub running_tasks: u32,
    pub max_concurrent_tasks: u32,
}

/// Credentials issued to a Worker at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerCredentials {
    pub api_key: String,
    pub secret_key: String,
}

/// A registered Worker (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub status: WorkerStatus,
    pub region: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub os_info: Option<String>,
    /// Free-form, Worker-advertised capabilities (e.g. `{"python": "3.12", "gpu": true}`).
    #[serde(default)]
    pub capabilities: serde_json::Value,
    #[serde(default)]
    pub resource_limits: serde_json::Value,
    pub last_heartbeat_ms: Option<u64>,
    pub metrics: Option<WorkerMetrics>,
    pub credentials: WorkerCredentials,
}

impl Worker {
    crate::setters! {
        set {
            tags: Vec<String>,
            capabilities: serde_json::Value,
            resource_limits: serde_json::Value,
        }
        option {
            region: String,
        }
    }

    /// True if the Worker's advertised capabilities satisfy every
    /// requirement named in `required` (spec §4.10 `auto` resolver).
    pub fn satisfies(&self, required: &HashMap<String, serde_json::Value>) -> bool {
        let caps = match self.capabilities.as_object() {
            Some(map) => map,
            None => return required.is_empty(),
        };
        required
            .iter()
            .all(|(k, v)| caps.get(k).is_some_and(|have| have == v))
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct WorkerBuilder => Worker {
        into {
            name: String = "worker-1",
            host: String = "127.0.0.1",
        }
        set {
            id: WorkerId = WorkerId::new(),
            port: u16 = 7000,
            status: WorkerStatus = WorkerStatus::Offline,
            tags: Vec<String> = Vec::new(),
            capabilities: serde_json::Value = serde_json::json!({}),
            resource_limits: serde_json::Value = serde_json::json!({}),
            last_heartbeat_ms: Option<u64> = None,
            metrics: Option<WorkerMetrics> = None,
        }
        option {
            region: String = None,
        }
        computed {
            os_info: Option<String> = None,
            credentials: WorkerCredentials = WorkerCredentials {
                api_key: nanoid::nanoid!(21),
                secret_key: nanoid::nanoid!(32),
            },
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
