// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::thread::sleep;

#[test]
fn duplicate_within_ttl_returns_cached_outcome() {
    let cache: ReceiptCache<bool> = ReceiptCache::new(Duration::from_secs(5));
    cache.record("w1", "m1", true);
    assert_eq!(cache.check("w1", "m1"), Some(true));
    assert_eq!(cache.check("w1", "m1"), Some(true));
}

#[test]
fn negative_outcomes_are_cached_too() {
    let cache: ReceiptCache<bool> = ReceiptCache::new(Duration::from_secs(5));
    cache.record("w1", "m1", false);
    assert_eq!(cache.check("w1", "m1"), Some(false));
}

#[test]
fn expired_entry_is_purged_on_lookup() {
    let cache: ReceiptCache<bool> = ReceiptCache::new(Duration::from_millis(10));
    cache.record("w1", "m1", true);
    sleep(Duration::from_millis(30));
    assert_eq!(cache.check("w1", "m1"), None);
    assert!(cache.is_empty());
}

#[test]
fn cache_is_scoped_per_worker() {
    let cache: ReceiptCache<bool> = ReceiptCache::new(Duration::from_secs(5));
    cache.record("w1", "m1", true);
    assert_eq!(cache.check("w2", "m1"), None);
}

#[test]
fn sweep_evicts_stale_entries_without_lookup() {
    let cache: ReceiptCache<bool> = ReceiptCache::new(Duration::from_millis(10));
    cache.record("w1", "m1", true);
    sleep(Duration::from_millis(30));
    cache.sweep();
    assert!(cache.is_empty());
}

#[test]
fn keyed_variant_behaves_identically() {
    let cache: KeyedReceiptCache<(String, String), u32> = KeyedReceiptCache::new(Duration::from_secs(5));
    let key = ("w1".to_string(), "r1".to_string());
    cache.record(key.clone(), 200);
    assert_eq!(cache.check(&key), Some(200));
}
