// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project Artifact Service (spec §4.4, component C4).
//!
//! Extraction safety (zip-slip, oversize, symlink) is enforced as a
//! pre-flight walk of the archive's central directory before any member is
//! written to the object store. The `zip` crate's synchronous API runs
//! inside `spawn_blocking`, mirroring how the compilation pipeline in the
//! reference pack offloads archive work off the async runtime.

use crate::error::{ExtractionRejection, StorageError};
use crate::object_store::ObjectStore;
use crate::repository::ProjectStore;
use grid_core::{NodeProject, ProjectDetail, ProjectId, SyncStatus, TrackedFile, WorkerId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read as _;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    pub max_total_size: u64,
    pub max_files: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self { max_total_size: 200 * 1024 * 1024, max_files: 5_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub path: String,
    pub hash: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub version: u32,
    pub files: Vec<ManifestEntry>,
    pub total_size: u64,
    pub file_count: usize,
}

pub enum VersionSelector {
    Draft,
    Latest,
    Exact(u32),
}

/// Unpacks, versions, and tracks distribution of [`grid_core::Project`]
/// artifacts. The object store holds three regions per project:
/// `projects/{id}/draft/` (current editable tree), `projects/{id}/versions/{n}/`
/// (published snapshots), and `projects/{id}/versions/{n}/artifact.zip`
/// (the distributable bundle for that version).
pub struct ProjectArtifactService {
    store: Arc<dyn ObjectStore>,
    limits: ExtractLimits,
}

impl ProjectArtifactService {
    pub fn new(store: Arc<dyn ObjectStore>, limits: ExtractLimits) -> Self {
        Self { store, limits }
    }

    fn draft_prefix(project_id: &ProjectId) -> String {
        format!("projects/{project_id}/draft/")
    }

    fn version_prefix(project_id: &ProjectId, version: u32) -> String {
        format!("projects/{project_id}/versions/{version}/")
    }

    fn manifest_key(project_id: &ProjectId, version: u32) -> String {
        format!("{}manifest.json", Self::version_prefix(project_id, version))
    }

    fn artifact_key(project_id: &ProjectId, version: u32) -> String {
        format!("{}artifact.zip", Self::version_prefix(project_id, version))
    }

    /// Unpack a zip archive into the project's draft tree, rejecting it
    /// outright (no partial writes) if any entry fails the pre-flight walk
    /// (spec §4.4 "Failure": oversize, too many files, illegal path,
    /// symlink, unsupported format).
    pub async fn unpack_on_ingest(
        &self,
        project_id: &ProjectId,
        zip_bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        let limits = self.limits;
        let members = tokio::task::spawn_blocking(move || preflight_and_read(&zip_bytes, limits))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))??;

        let prefix = Self::draft_prefix(project_id);
        for (path, bytes) in members {
            self.store.put(&format!("{prefix}{path}"), bytes).await?;
        }
        Ok(())
    }

    /// Apply a draft edit end to end (spec §4.4 point 4): unpack the new
    /// archive into the draft tree, invalidate every Worker's distribution
    /// row, and increment the project's dirty counter.
    pub async fn edit_draft(
        &self,
        projects: &dyn ProjectStore,
        node_projects: &dyn crate::repository::NodeProjectStore,
        project_id: &ProjectId,
        zip_bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.unpack_on_ingest(project_id, zip_bytes).await?;
        self.mark_all_stale(node_projects, project_id).await?;

        let mut project = projects.get(project_id).await?;
        if let ProjectDetail::File(ref mut detail) = project.detail {
            detail.dirty += 1;
        }
        projects.put(project).await
    }

    /// Snapshot the current draft tree as a new published version: hash
    /// every file, write a manifest, and bundle an `artifact.zip` (spec
    /// §4.4 "Publish").
    pub async fn publish_version(&self, project_id: &ProjectId) -> Result<Manifest, StorageError> {
        let draft_prefix = Self::draft_prefix(project_id);
        let mut cursor = None;
        let mut entries = Vec::new();
        loop {
            let page = self.store.list(&draft_prefix, cursor.clone(), 1000).await?;
            let done = page.cursor.is_none();
            entries.extend(page.entries);
            cursor = page.cursor;
            if done {
                break;
            }
        }

        let version = self.next_version(project_id).await?;
        let mut files = Vec::with_capacity(entries.len());
        let mut archive_members = Vec::with_capacity(entries.len());
        let mut total_size = 0u64;
        for entry in &entries {
            let relative = entry.key.strip_prefix(&draft_prefix).unwrap_or(&entry.key).to_string();
            let bytes = self.store.get(&entry.key).await?;
            let hash = hex::encode(Sha256::digest(&bytes));
            total_size += bytes.len() as u64;
            files.push(ManifestEntry { path: relative.clone(), hash, size: bytes.len() as u64 });
            archive_members.push((relative, bytes));
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let manifest =
            Manifest { version, files, total_size, file_count: archive_members.len() };
        let manifest_bytes =
            serde_json::to_vec_pretty(&manifest).map_err(|e| StorageError::Internal(e.to_string()))?;
        self.store.put(&Self::manifest_key(project_id, version), manifest_bytes).await?;

        let archive_bytes = tokio::task::spawn_blocking(move || build_zip(archive_members))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))??;
        self.store.put(&Self::artifact_key(project_id, version), archive_bytes).await?;

        Ok(manifest)
    }

    async fn next_version(&self, project_id: &ProjectId) -> Result<u32, StorageError> {
        let prefix = format!("projects/{project_id}/versions/");
        let page = self.store.list(&prefix, None, 10_000).await?;
        let max = page
            .entries
            .iter()
            .filter_map(|e| e.key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter_map(|segment| segment.parse::<u32>().ok())
            .max();
        Ok(max.map(|m| m + 1).unwrap_or(1))
    }

    pub async fn read_manifest(
        &self,
        project_id: &ProjectId,
        selector: VersionSelector,
    ) -> Result<Manifest, StorageError> {
        let version = match selector {
            VersionSelector::Exact(v) => v,
            VersionSelector::Latest => self.latest_version(project_id).await?,
            VersionSelector::Draft => {
                return Err(StorageError::Internal("draft has no manifest".into()))
            }
        };
        let bytes = self.store.get(&Self::manifest_key(project_id, version)).await?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Internal(e.to_string()))
    }

    async fn latest_version(&self, project_id: &ProjectId) -> Result<u32, StorageError> {
        let next = self.next_version(project_id).await?;
        if next == 1 {
            return Err(StorageError::NotFound(format!("no published versions for {project_id}")));
        }
        Ok(next - 1)
    }

    /// Read a single member out of a published version's `artifact.zip`
    /// without unpacking the whole bundle.
    pub async fn read_member(
        &self,
        project_id: &ProjectId,
        version: u32,
        member_path: &str,
    ) -> Result<Vec<u8>, StorageError> {
        let archive_bytes = self.store.get(&Self::artifact_key(project_id, version)).await?;
        let member_path = member_path.to_string();
        tokio::task::spawn_blocking(move || read_zip_member(&archive_bytes, &member_path))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
    }

    /// Record a successful distribution to `worker_id` (spec §3
    /// "NodeProject" upsert on successful dispatch). A row that flips from
    /// `stale` to `synced` here decrements the project's dirty counter
    /// (spec §9 "Project dirty clearing"); `projects` is optional since not
    /// every caller (e.g. a first-ever sync) needs the counter touched.
    pub async fn record_dispatch(
        &self,
        node_projects: &dyn crate::repository::NodeProjectStore,
        projects: Option<&dyn ProjectStore>,
        worker_id: WorkerId,
        project_id: ProjectId,
        manifest: &Manifest,
        transfer_method: &str,
        now_ms: u64,
    ) -> Result<(), StorageError> {
        let files = manifest
            .files
            .iter()
            .map(|f| TrackedFile { path: f.path.clone(), hash: f.hash.clone(), size: f.size })
            .collect();
        let combined_hash = hex::encode(Sha256::digest(
            manifest.files.iter().map(|f| f.hash.as_str()).collect::<Vec<_>>().join(",").as_bytes(),
        ));
        let mut cleared_stale = false;
        let row = match node_projects.get(&worker_id, &project_id).await {
            Some(mut existing) => {
                let was_stale = existing.status == SyncStatus::Stale;
                existing.record_sync(&combined_hash, manifest.total_size, &combined_hash, now_ms);
                cleared_stale = was_stale && existing.status == SyncStatus::Synced;
                existing.files = files;
                existing
            }
            None => NodeProject {
                worker_ref: worker_id,
                project_ref: project_id,
                file_hash: combined_hash,
                file_size: manifest.total_size,
                transfer_method: transfer_method.to_string(),
                synced_at_ms: now_ms,
                status: SyncStatus::Synced,
                sync_count: 1,
                last_used_at_ms: Some(now_ms),
                files,
            },
        };
        node_projects.put(row).await?;

        if cleared_stale {
            if let Some(projects) = projects {
                let mut project = projects.get(&project_id).await?;
                if let ProjectDetail::File(ref mut detail) = project.detail {
                    detail.dirty = detail.dirty.saturating_sub(1);
                }
                projects.put(project).await?;
            }
        }
        Ok(())
    }

    /// A draft edit invalidates every Worker's copy (spec §3 invariant "a
    /// project modification sets every row to stale").
    pub async fn mark_all_stale(
        &self,
        node_projects: &dyn crate::repository::NodeProjectStore,
        project_id: &ProjectId,
    ) -> Result<(), StorageError> {
        for mut row in node_projects.list_for_project(project_id).await? {
            row.mark_stale();
            node_projects.put(row).await?;
        }
        Ok(())
    }
}

fn preflight_and_read(
    zip_bytes: &[u8],
    limits: ExtractLimits,
) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
    let reader = std::io::Cursor::new(zip_bytes);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|_| StorageError::Validation(ExtractionRejection::UnsupportedFormat))?;

    if archive.len() > limits.max_files {
        return Err(StorageError::Validation(ExtractionRejection::TooManyFiles {
            count: archive.len(),
            limit: limits.max_files,
        }));
    }

    let mut total_size = 0u64;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|_| StorageError::Validation(ExtractionRejection::UnsupportedFormat))?;
        let name = entry.name();
        if entry.is_symlink() {
            return Err(StorageError::Validation(ExtractionRejection::SymlinkPresent(name.to_string())));
        }
        if name.starts_with('/') || name.contains("..") {
            return Err(StorageError::Validation(ExtractionRejection::IllegalPath(name.to_string())));
        }
        total_size += entry.size();
        if total_size > limits.max_total_size {
            return Err(StorageError::Validation(ExtractionRejection::Oversize {
                extracted: total_size,
                limit: limits.max_total_size,
            }));
        }
    }

    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|_| StorageError::Validation(ExtractionRejection::UnsupportedFormat))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        members.push((name, bytes));
    }
    Ok(members)
}

fn build_zip(members: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, StorageError> {
    use std::io::Write as _;
    let mut buf = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut buf);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (path, bytes) in members {
        writer.start_file(path, options).map_err(|e| StorageError::Internal(e.to_string()))?;
        writer.write_all(&bytes)?;
    }
    writer.finish().map_err(|e| StorageError::Internal(e.to_string()))?;
    Ok(buf.into_inner())
}

fn read_zip_member(zip_bytes: &[u8], member_path: &str) -> Result<Vec<u8>, StorageError> {
    let reader = std::io::Cursor::new(zip_bytes);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|_| StorageError::Validation(ExtractionRejection::UnsupportedFormat))?;
    let mut entry = archive
        .by_name(member_path)
        .map_err(|_| StorageError::NotFound(member_path.to_string()))?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
#[path = "artifact_service_tests.rs"]
mod tests;
