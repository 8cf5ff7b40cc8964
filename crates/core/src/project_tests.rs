// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn node_project() -> NodeProject {
    NodeProject {
        worker_ref: WorkerId::new(),
        project_ref: ProjectId::new(),
        file_hash: "abc".to_string(),
        file_size: 10,
        transfer_method: "push".to_string(),
        synced_at_ms: 0,
        status: SyncStatus::Synced,
        sync_count: 1,
        last_used_at_ms: None,
        files: Vec::new(),
    }
}

#[test]
fn mark_stale_flips_status() {
    let mut np = node_project();
    np.mark_stale();
    assert_eq!(np.status, SyncStatus::Stale);
}

#[test]
fn sync_against_current_committed_hash_clears_dirty() {
    let mut np = node_project();
    np.mark_stale();
    np.record_sync("new-hash", 20, "new-hash", 100);
    assert_eq!(np.status, SyncStatus::Synced);
    assert_eq!(np.sync_count, 2);
    assert_eq!(np.synced_at_ms, 100);
}

#[test]
fn sync_against_a_superseded_hash_stays_stale() {
    let mut np = node_project();
    np.mark_stale();
    // Worker delivers an old hash (redelivery / straggler) after the draft
    // moved on to "newest-hash" — row must remain stale.
    np.record_sync("old-hash", 20, "newest-hash", 100);
    assert_eq!(np.status, SyncStatus::Stale);
}

#[test]
fn pagination_expands_one_url_per_page() {
    let config = PaginationConfig {
        url_pattern: "https://example.com/p/{page}".to_string(),
        start_page: 1,
        end_page: 3,
    };
    let pages = config.expand();
    assert_eq!(
        pages,
        vec![
            (1, "https://example.com/p/1".to_string()),
            (2, "https://example.com/p/2".to_string()),
            (3, "https://example.com/p/3".to_string()),
        ]
    );
}
