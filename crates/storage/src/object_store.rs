// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact Store Client (spec §4.3, component C3).
//!
//! The object store itself is an out-of-scope external collaborator (spec
//! §1); this module is the trait boundary plus a filesystem-backed
//! reference implementation used for single-node deployments and tests.
//! A production S3 backend is a drop-in behind [`ObjectStore`] (documented
//! seam; not implemented here — see DESIGN.md).

use crate::error::StorageError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ListEntry {
    pub key: String,
    pub size: u64,
    pub last_modified_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub entries: Vec<ListEntry>,
    pub cursor: Option<String>,
}

/// Byte-blob store abstraction (spec §4.3). No assumption of strong
/// consistency on `list` — callers must tolerate short-window
/// read-your-writes lag, per spec.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn get_size(&self, key: &str) -> Result<u64, StorageError>;
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
    async fn list(
        &self,
        prefix: &str,
        cursor: Option<String>,
        max_keys: usize,
    ) -> Result<ListPage, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
    async fn delete_many(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }
    /// Presigned PUT url. The filesystem backend returns a `file://` URL
    /// with no real expiry enforcement — real expiry is a property of the
    /// production S3-compatible backend this trait stands in for.
    async fn presign_put(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
    async fn copy(&self, src: &str, dst: &str) -> Result<(), StorageError>;
}

/// Local filesystem-backed [`ObjectStore`] for single-node deployments and
/// tests. Keys are forward-slash paths relative to `root`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
            return Err(StorageError::Internal(format!("illegal object key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_size(&self, key: &str) -> Result<u64, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::metadata(&path).await.is_ok())
    }

    async fn list(
        &self,
        prefix: &str,
        cursor: Option<String>,
        max_keys: usize,
    ) -> Result<ListPage, StorageError> {
        let mut entries = Vec::new();
        collect_entries(&self.root, &self.root.join(prefix), &mut entries).await?;
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        let start = match cursor {
            Some(after) => entries.iter().position(|e| e.key > after).unwrap_or(entries.len()),
            None => 0,
        };
        let page: Vec<ListEntry> = entries.into_iter().skip(start).take(max_keys).collect();
        let next_cursor = if page.len() == max_keys { page.last().map(|e| e.key.clone()) } else { None };
        Ok(ListPage { entries: page, cursor: next_cursor })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn presign_put(&self, key: &str, _ttl: Duration) -> Result<String, StorageError> {
        let path = self.resolve(key)?;
        Ok(format!("file://{}", path.display()))
    }

    async fn presign_get(&self, key: &str, _ttl: Duration) -> Result<String, StorageError> {
        let path = self.resolve(key)?;
        Ok(format!("file://{}", path.display()))
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<(), StorageError> {
        let src_path = self.resolve(src)?;
        let dst_path = self.resolve(dst)?;
        if let Some(parent) = dst_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&src_path, &dst_path).await?;
        Ok(())
    }
}

async fn collect_entries(
    root: &Path,
    dir: &Path,
    out: &mut Vec<ListEntry>,
) -> Result<(), StorageError> {
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut read_dir = match tokio::fs::read_dir(&current).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let meta = entry.metadata().await?;
            if meta.is_dir() {
                stack.push(path);
            } else {
                let key = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace(std::path::MAIN_SEPARATOR, "/");
                let modified_ms = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0);
                out.push(ListEntry { key, size: meta.len(), last_modified_ms: modified_ms });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "object_store_tests.rs"]
mod tests;
