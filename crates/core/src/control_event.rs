// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-event bus record shape (spec §4.11, component C11).
//!
//! The bus itself (a durable, bounded, append-only stream with consumer
//! groups) is an out-of-scope external collaborator (spec §1); this module
//! defines only the event payload and the in-process bounded-ring
//! reference implementation documented in SPEC_FULL.md §4.11.

use crate::task::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlEventKind {
    /// A task's configuration changed; master must re-read it from the
    /// database and re-evaluate scheduling.
    TaskChanged,
    /// A task should fire immediately (manual trigger or control-role
    /// API call forwarded to master).
    TaskTrigger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlEvent {
    pub event: ControlEventKind,
    pub task_id: TaskId,
    pub timestamp_ms: u64,
}

/// Bounded append-only buffer (`xadd ... maxlen` semantics). Event loss is
/// tolerated once `maxlen` is exceeded because the database remains the
/// source of truth (spec §4.11).
///
/// `total_published` counts every `publish()` ever made, including events
/// since evicted by the `maxlen` bound, so a consumer's offset stays
/// meaningful even after eviction (`read_from` can tell it skipped past
/// dropped entries rather than silently replaying from the wrong point).
pub struct BoundedEventLog {
    maxlen: usize,
    events: VecDeque<ControlEvent>,
    total_published: u64,
}

impl BoundedEventLog {
    pub fn new(maxlen: usize) -> Self {
        Self {
            maxlen,
            events: VecDeque::with_capacity(maxlen.min(1024)),
            total_published: 0,
        }
    }

    pub fn publish(&mut self, event: ControlEvent) {
        if self.events.len() >= self.maxlen {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self.total_published += 1;
    }

    /// Events strictly after `from_index`, in publish order, plus the
    /// highest index now in the log (for consumer-group bookkeeping).
    pub fn read_from(&self, from_index: u64) -> (Vec<&ControlEvent>, u64) {
        let dropped = self.total_published.saturating_sub(self.events.len() as u64);
        let skip = from_index.saturating_sub(dropped) as usize;
        let events = self.events.iter().skip(skip).collect();
        (events, self.total_published)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
#[path = "control_event_tests.rs"]
mod tests;
