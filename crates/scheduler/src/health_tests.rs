// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use grid_core::WorkerId;

fn registry() -> NodeRegistry {
    NodeRegistry::new(Duration::from_secs(30))
}

#[test]
fn first_heartbeat_from_unseen_worker_emits_online_event() {
    let registry = registry();
    let worker_id = WorkerId::new();

    let event = registry.observe_heartbeat(worker_id, 1_000, WorkerMetrics::default());

    let event = event.expect("first heartbeat should transition offline -> online");
    assert_eq!(event.from, WorkerStatus::Offline);
    assert_eq!(event.to, WorkerStatus::Online);
    assert_eq!(registry.status(&worker_id), Some(WorkerStatus::Online));
}

#[test]
fn repeated_heartbeat_while_online_emits_no_event() {
    let registry = registry();
    let worker_id = WorkerId::new();

    registry.observe_heartbeat(worker_id, 1_000, WorkerMetrics::default());
    let second = registry.observe_heartbeat(worker_id, 2_000, WorkerMetrics::default());

    assert!(second.is_none());
}

#[test]
fn scan_marks_silent_worker_offline_after_t_offline() {
    let registry = registry();
    let worker_id = WorkerId::new();
    registry.observe_heartbeat(worker_id, 0, WorkerMetrics::default());

    let events = registry.scan(20_000);
    assert!(events.is_empty(), "within T_offline, worker should remain online");

    let events = registry.scan(31_000);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].to, WorkerStatus::Offline);
    assert_eq!(registry.status(&worker_id), Some(WorkerStatus::Offline));
}

#[test]
fn heartbeat_after_offline_transitions_back_to_online() {
    let registry = registry();
    let worker_id = WorkerId::new();
    registry.observe_heartbeat(worker_id, 0, WorkerMetrics::default());
    registry.scan(31_000);
    assert_eq!(registry.status(&worker_id), Some(WorkerStatus::Offline));

    let event = registry.observe_heartbeat(worker_id, 32_000, WorkerMetrics::default());
    let event = event.expect("heartbeat after offline should re-transition to online");
    assert_eq!(event.from, WorkerStatus::Offline);
    assert_eq!(event.to, WorkerStatus::Online);
}

#[test]
fn transient_error_marks_worker_unreachable() {
    let registry = registry();
    let worker_id = WorkerId::new();
    registry.observe_heartbeat(worker_id, 0, WorkerMetrics::default());

    registry.observe_transient_error(worker_id);

    assert_eq!(registry.status(&worker_id), Some(WorkerStatus::Unreachable));
}
