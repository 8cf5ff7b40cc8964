// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-Worker idempotency cache (spec §4.2, component C1).
//!
//! `(worker_id, message_id) -> (inserted_at, outcome)`. This is a
//! correctness property, not a general memoization facility — it is its own
//! bounded, TTL-evicting structure so it can never be swapped for a cache
//! that drops entries under memory pressure (spec §9).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<O> {
    inserted_at: Instant,
    outcome: O,
}

/// TTL-bounded idempotency cache keyed by `(worker_id, message_id)`.
///
/// Generic over the cached outcome `O` so both `ack_task` and
/// `report_result` reuse one implementation with different outcome types.
pub struct ReceiptCache<O> {
    ttl: Duration,
    entries: Mutex<HashMap<(String, String), Entry<O>>>,
    /// Bound on total entries; a periodic sweep (see [`Self::sweep`]) keeps
    /// this from growing without limit under sustained traffic.
    max_entries: usize,
}

impl<O: Clone> ReceiptCache<O> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, 100_000)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    /// Returns the cached outcome if present and not expired; purges the
    /// entry opportunistically if it has expired.
    pub fn check(&self, worker_id: &str, message_id: &str) -> Option<O> {
        let mut entries = self.entries.lock();
        let key = (worker_id.to_string(), message_id.to_string());
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => Some(entry.outcome.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Records an outcome, overwriting any prior entry for the same key.
    /// Negative outcomes are cached exactly like positive ones so
    /// redelivered duplicates resolve identically (spec §4.2).
    pub fn record(&self, worker_id: &str, message_id: &str, outcome: O) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries {
            Self::sweep_locked(&mut entries, self.ttl);
        }
        entries.insert(
            (worker_id.to_string(), message_id.to_string()),
            Entry {
                inserted_at: Instant::now(),
                outcome,
            },
        );
    }

    /// Bounded periodic sweep of expired entries; call from a background
    /// tick in addition to the lazy eviction on lookup.
    pub fn sweep(&self) {
        let mut entries = self.entries.lock();
        Self::sweep_locked(&mut entries, self.ttl);
    }

    fn sweep_locked(entries: &mut HashMap<(String, String), Entry<O>>, ttl: Duration) {
        entries.retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Alternate key-typed variant for callers who have already parsed a
/// strongly-typed worker/message id pair and want to avoid repeated
/// string allocation. `K` must already be `Eq + Hash + Clone`.
pub struct KeyedReceiptCache<K, O> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<O>>>,
}

impl<K: Eq + Hash + Clone, O: Clone> KeyedReceiptCache<K, O> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &K) -> Option<O> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => Some(entry.outcome.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn record(&self, key: K, outcome: O) {
        self.entries.lock().insert(
            key,
            Entry {
                inserted_at: Instant::now(),
                outcome,
            },
        );
    }
}

#[cfg(test)]
#[path = "receipt_tests.rs"]
mod tests;
