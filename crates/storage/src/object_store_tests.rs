// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn put_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    store.put("projects/p1/a.txt", b"hello".to_vec()).await.unwrap();
    let got = store.get("projects/p1/a.txt").await.unwrap();
    assert_eq!(got, b"hello");
}

#[tokio::test]
async fn get_missing_key_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    let err = store.get("missing").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn exists_reflects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    assert!(!store.exists("k").await.unwrap());
    store.put("k", b"x".to_vec()).await.unwrap();
    assert!(store.exists("k").await.unwrap());
}

#[tokio::test]
async fn list_returns_entries_under_prefix_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    store.put("logs/run-1/stdout.jsonl", b"a".to_vec()).await.unwrap();
    store.put("logs/run-1/stderr.jsonl", b"bb".to_vec()).await.unwrap();
    store.put("logs/run-2/stdout.jsonl", b"c".to_vec()).await.unwrap();
    let page = store.list("logs/run-1", None, 10).await.unwrap();
    assert_eq!(page.entries.len(), 2);
    assert!(page.entries[0].key < page.entries[1].key);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    store.put("k", b"x".to_vec()).await.unwrap();
    store.delete("k").await.unwrap();
    store.delete("k").await.unwrap();
    assert!(!store.exists("k").await.unwrap());
}

#[tokio::test]
async fn path_traversal_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    let err = store.put("../escape", b"x".to_vec()).await.unwrap_err();
    assert!(matches!(err, StorageError::Internal(_)));
}

#[tokio::test]
async fn copy_duplicates_bytes_under_new_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    store.put("src", b"payload".to_vec()).await.unwrap();
    store.copy("src", "dst").await.unwrap();
    assert_eq!(store.get("dst").await.unwrap(), b"payload");
}
