// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable-state boundary: the Artifact Store Client (C3), Project Artifact
//! Service (C4), Log Pipeline (C5), and the Task/Run/Worker/Project
//! repository traits behind which a relational database or filesystem
//! backend lives.

pub mod artifact_service;
pub mod error;
pub mod log_pipeline;
pub mod object_store;
pub mod repository;

pub use artifact_service::{ExtractLimits, Manifest, ManifestEntry, ProjectArtifactService, VersionSelector};
pub use error::{ExtractionRejection, StorageError};
pub use log_pipeline::{LogPipeline, LogPipelineConfig, LogRecord, LogSink, LogStream};
pub use object_store::{FsObjectStore, ListEntry, ListPage, ObjectStore};
pub use repository::{InMemoryStore, NodeProjectStore, ProjectStore, RunStore, TaskStore, WorkerStore};
