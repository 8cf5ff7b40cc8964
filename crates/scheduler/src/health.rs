// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node Registry & Health (spec §4.8, component C8).
//!
//! Authoritative Worker state lives in `grid-storage`; this module is the
//! small in-process cache of `(worker_id -> last_heartbeat, last_known_status)`
//! that lets the health scan and the `auto` resolver avoid a store hit per
//! tick, published copy-on-write via [`grid_core::Snapshot`] (spec §9
//! "Adaptive heartbeat sweeper").

use grid_core::{Snapshot, WorkerId, WorkerMetrics, WorkerStatus};
use std::time::Duration;

/// One cached Worker health record.
#[derive(Debug, Clone)]
pub struct CachedHealth {
    pub status: WorkerStatus,
    pub last_heartbeat_ms: u64,
    pub metrics: Option<WorkerMetrics>,
}

/// A status transition the scan decided to make, for the caller to persist
/// and turn into a [`grid_core::ControlEvent`] / `NodeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent {
    pub worker_id: WorkerId,
    pub from: WorkerStatus,
    pub to: WorkerStatus,
}

pub struct NodeRegistry {
    cache: Snapshot<WorkerId, CachedHealth>,
    t_offline: Duration,
}

impl NodeRegistry {
    pub fn new(t_offline: Duration) -> Self {
        Self { cache: Snapshot::new(), t_offline }
    }

    /// Heartbeat ingest (spec §4.8): updates `last_heartbeat` and the
    /// latest metrics snapshot atomically. Returns the event to emit if this
    /// observation flips the Worker from `OFFLINE`/`UNREACHABLE` to `ONLINE`.
    pub fn observe_heartbeat(
        &self,
        worker_id: WorkerId,
        now_ms: u64,
        metrics: WorkerMetrics,
    ) -> Option<NodeEvent> {
        let previous = self.cache.read().get(&worker_id).cloned();
        let from_status = previous.as_ref().map(|c| c.status).unwrap_or(WorkerStatus::Offline);

        self.cache.update(
            worker_id,
            CachedHealth { status: WorkerStatus::Online, last_heartbeat_ms: now_ms, metrics: Some(metrics) },
        );

        if from_status != WorkerStatus::Online {
            Some(NodeEvent { worker_id, from: from_status, to: WorkerStatus::Online })
        } else {
            None
        }
    }

    /// A transient transport error talking to this Worker (spec §4.8
    /// diagram: "transient error -> UNREACHABLE").
    pub fn observe_transient_error(&self, worker_id: WorkerId) {
        let mut record = self.cache.read().get(&worker_id).cloned().unwrap_or(CachedHealth {
            status: WorkerStatus::Offline,
            last_heartbeat_ms: 0,
            metrics: None,
        });
        record.status = WorkerStatus::Unreachable;
        self.cache.update(worker_id, record);
    }

    pub fn status(&self, worker_id: &WorkerId) -> Option<WorkerStatus> {
        self.cache.read().get(worker_id).map(|c| c.status)
    }

    pub fn metrics(&self, worker_id: &WorkerId) -> Option<WorkerMetrics> {
        self.cache.read().get(worker_id).and_then(|c| c.metrics.clone())
    }

    pub fn seed(&self, worker_id: WorkerId, status: WorkerStatus, last_heartbeat_ms: u64) {
        self.cache.update(worker_id, CachedHealth { status, last_heartbeat_ms, metrics: None });
    }

    /// The 3-second smart scan (spec §4.8 "Smart scan"): walk every cached
    /// Worker that was online within the last `T_offline` and flip it to
    /// `OFFLINE` if no heartbeat has landed since. Workers the cache has
    /// never seen online are not scanned — Worker absence alone is not a
    /// transition, only silence after presence is.
    pub fn scan(&self, now_ms: u64) -> Vec<NodeEvent> {
        let mut events = Vec::new();
        let snapshot = self.cache.read();
        for (worker_id, record) in snapshot.iter() {
            if record.status != WorkerStatus::Online {
                continue;
            }
            let elapsed = now_ms.saturating_sub(record.last_heartbeat_ms);
            if elapsed > self.t_offline.as_millis() as u64 {
                events.push(NodeEvent { worker_id: *worker_id, from: WorkerStatus::Online, to: WorkerStatus::Offline });
            }
        }
        for event in &events {
            let mut record = snapshot.get(&event.worker_id).cloned().unwrap_or(CachedHealth {
                status: WorkerStatus::Offline,
                last_heartbeat_ms: 0,
                metrics: None,
            });
            record.status = WorkerStatus::Offline;
            self.cache.update(event.worker_id, record);
        }
        events
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
