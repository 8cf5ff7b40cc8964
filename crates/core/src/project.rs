// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project artifact and per-Worker distribution state (spec §3 "Project",
//! "NodeProject").

use crate::task::ExecutionStrategy;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a Project.
    pub struct ProjectId("prj-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    File,
    Code,
    Rule,
}

crate::simple_display! {
    ProjectType {
        File => "file",
        Code => "code",
        Rule => "rule",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Active,
    Inactive,
    Archived,
}

crate::simple_display! {
    ProjectStatus {
        Draft => "draft",
        Active => "active",
        Inactive => "inactive",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimePlacement {
    pub env_location: Option<String>,
    pub worker_ref: Option<WorkerId>,
    pub worker_env_name: Option<String>,
    pub python_version: Option<String>,
    pub venv_scope: Option<String>,
}

/// File-backed project detail (spec §3 "FILE").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDetail {
    pub file_path: String,
    pub file_hash: String,
    pub entry_point: String,
    pub is_compressed: bool,
    pub draft_manifest_key: String,
    pub published_version: Option<u32>,
    pub dirty: u32,
}

/// Inline-code project detail (spec §3 "CODE").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDetail {
    pub content: String,
    pub language: String,
    pub content_hash: String,
    pub entry_point: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlerEngine {
    Browser,
    Requests,
    CurlCffi,
}

/// Rule-driven crawler project detail (spec §3 "RULE").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDetail {
    pub engine: CrawlerEngine,
    pub target_url: String,
    pub extraction_rules: serde_json::Value,
    pub pagination: Option<PaginationConfig>,
    pub request_shaping: serde_json::Value,
}

/// URL-pattern pagination config driving the Scheduler's rule-task fan-out
/// (spec §4.10 "Rule-task fan-out").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub url_pattern: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl PaginationConfig {
    /// Expand this config into one URL per page.
    pub fn expand(&self) -> Vec<(u32, String)> {
        (self.start_page..=self.end_page)
            .map(|n| (n, self.url_pattern.replace("{page}", &n.to_string())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectDetail {
    File(FileDetail),
    Code(CodeDetail),
    Rule(RuleDetail),
}

/// Draft/published project artifact (spec §3 "Project").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub placement: RuntimePlacement,
    pub execution_strategy: ExecutionStrategy,
    pub bound_worker_ref: Option<WorkerId>,
    pub detail: ProjectDetail,
}

/// Distribution sync status of a single tracked file within a Worker's copy
/// of a project (spec §3 "NodeProject" `file-level child tracking`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFile {
    pub path: String,
    pub hash: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    Stale,
}

/// Per-`(worker, project)` distribution state (spec §3 "NodeProject").
/// Invariant: exactly one row per pair, enforced by the repository
/// (`grid-storage`) keying on `(worker_ref, project_ref)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeProject {
    pub worker_ref: WorkerId,
    pub project_ref: ProjectId,
    pub file_hash: String,
    pub file_size: u64,
    pub transfer_method: String,
    pub synced_at_ms: u64,
    pub status: SyncStatus,
    pub sync_count: u32,
    pub last_used_at_ms: Option<u64>,
    pub files: Vec<TrackedFile>,
}

impl NodeProject {
    /// Mark stale after a draft edit, per spec §3 invariant ("a project
    /// modification sets every row to stale").
    pub fn mark_stale(&mut self) {
        self.status = SyncStatus::Stale;
    }

    /// Resolved per spec §9 open question: the row (and the project's
    /// dirty counter, tracked separately on [`FileDetail::dirty`]) clears
    /// only when this row syncs against the *currently committed* draft
    /// hash — a sync against a hash that is no longer current must not
    /// flip the row back to `synced`.
    pub fn record_sync(&mut self, hash: &str, size: u64, current_committed_hash: &str, at_ms: u64) {
        self.file_hash = hash.to_string();
        self.file_size = size;
        self.synced_at_ms = at_ms;
        self.sync_count += 1;
        self.status = if hash == current_committed_hash {
            SyncStatus::Synced
        } else {
            SyncStatus::Stale
        };
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
