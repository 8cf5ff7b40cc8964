// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-Event Bus (spec §4.11, component C11). The durable stream itself
//! is an out-of-scope external collaborator; [`InMemoryControlEventBus`] is
//! the bounded single-node reference implementation wrapping
//! [`grid_core::BoundedEventLog`], with a trait boundary a real durable
//! stream client can implement as a drop-in.

use grid_core::{ControlEvent, ControlEventKind};
use parking_lot::Mutex;

pub trait ControlEventBus: Send + Sync {
    fn publish(&self, event: ControlEvent);
    /// Events strictly after `from_index`, plus the index to resume from.
    fn read_from(&self, from_index: u64) -> (Vec<ControlEvent>, u64);
}

pub struct InMemoryControlEventBus {
    log: Mutex<grid_core::BoundedEventLog>,
}

impl InMemoryControlEventBus {
    pub fn new(maxlen: usize) -> Self {
        Self { log: Mutex::new(grid_core::BoundedEventLog::new(maxlen)) }
    }
}

impl ControlEventBus for InMemoryControlEventBus {
    fn publish(&self, event: ControlEvent) {
        self.log.lock().publish(event);
    }

    fn read_from(&self, from_index: u64) -> (Vec<ControlEvent>, u64) {
        let log = self.log.lock();
        let (events, next_index) = log.read_from(from_index);
        (events.into_iter().cloned().collect(), next_index)
    }
}

/// Convenience constructors matching spec §4.10's two event kinds.
pub fn task_changed(task_id: grid_core::TaskId, timestamp_ms: u64) -> ControlEvent {
    ControlEvent { event: ControlEventKind::TaskChanged, task_id, timestamp_ms }
}

pub fn task_trigger(task_id: grid_core::TaskId, timestamp_ms: u64) -> ControlEvent {
    ControlEvent { event: ControlEventKind::TaskTrigger, task_id, timestamp_ms }
}

#[cfg(test)]
#[path = "control_bus_tests.rs"]
mod tests;
