// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn event(task: &TaskId, ts: u64) -> ControlEvent {
    ControlEvent {
        event: ControlEventKind::TaskChanged,
        task_id: task.clone(),
        timestamp_ms: ts,
    }
}

#[test]
fn events_are_applied_in_publish_order() {
    let mut log = BoundedEventLog::new(10);
    let task = TaskId::new();
    for i in 0..5 {
        log.publish(event(&task, i));
    }
    let (events, _) = log.read_from(0);
    let timestamps: Vec<u64> = events.iter().map(|e| e.timestamp_ms).collect();
    assert_eq!(timestamps, vec![0, 1, 2, 3, 4]);
}

#[test]
fn bound_evicts_oldest_first() {
    let mut log = BoundedEventLog::new(3);
    let task = TaskId::new();
    for i in 0..5 {
        log.publish(event(&task, i));
    }
    assert_eq!(log.len(), 3);
    let (events, _) = log.read_from(0);
    let timestamps: Vec<u64> = events.iter().map(|e| e.timestamp_ms).collect();
    assert_eq!(timestamps, vec![2, 3, 4]);
}

#[test]
fn read_from_respects_consumer_offset_across_eviction() {
    let mut log = BoundedEventLog::new(2);
    let task = TaskId::new();
    for i in 0..4 {
        log.publish(event(&task, i));
    }
    // consumer had only seen up to index 1 (event with timestamp 1) before
    // the log evicted it; read_from(2) should return what remains from
    // index 2 onward, not panic or double-deliver.
    let (events, total) = log.read_from(2);
    assert_eq!(total, 4);
    let timestamps: Vec<u64> = events.iter().map(|e| e.timestamp_ms).collect();
    assert_eq!(timestamps, vec![2, 3]);
}
