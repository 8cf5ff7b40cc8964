// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-mostly copy-on-write snapshot (spec §9 "Adaptive heartbeat
//! sweeper" re-architecture pointer).
//!
//! Readers (the health scan, the `auto` resolver) take an `Arc` clone of
//! the whole map with no lock held during iteration. Writers publish a new
//! `Arc` only when a Worker's state actually changes, rather than taking a
//! lock per Worker.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

pub struct Snapshot<K, V> {
    current: Mutex<Arc<HashMap<K, V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> Default for Snapshot<K, V> {
    fn default() -> Self {
        Self {
            current: Mutex::new(Arc::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Snapshot<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap, lock-free-after-this-call read of the current state. The
    /// returned `Arc` is immutable even if a writer publishes concurrently.
    pub fn read(&self) -> Arc<HashMap<K, V>> {
        self.current.lock().clone()
    }

    /// Clone-on-write update of a single key. Acquires the write-half lock
    /// only for the swap itself, not for the whole mutation.
    pub fn update(&self, key: K, value: V) {
        let mut guard = self.current.lock();
        let mut next = HashMap::clone(&guard);
        next.insert(key, value);
        *guard = Arc::new(next);
    }

    pub fn remove(&self, key: &K) {
        let mut guard = self.current.lock();
        if guard.contains_key(key) {
            let mut next = HashMap::clone(&guard);
            next.remove(key);
            *guard = Arc::new(next);
        }
    }

    /// Replace the whole snapshot atomically (e.g. after a full reload
    /// from the database at startup).
    pub fn replace(&self, map: HashMap<K, V>) {
        *self.current.lock() = Arc::new(map);
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
