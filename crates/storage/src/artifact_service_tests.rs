// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::object_store::FsObjectStore;
use crate::repository::{InMemoryStore, NodeProjectStore};
use grid_core::ProjectId;
use std::io::Write as _;

fn zip_with(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut buf);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    buf.into_inner()
}

fn service(dir: &std::path::Path) -> ProjectArtifactService {
    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(dir));
    ProjectArtifactService::new(store, ExtractLimits::default())
}

#[tokio::test]
async fn unpack_then_publish_roundtrips_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let project_id = ProjectId::new();
    let archive = zip_with(&[("main.py", b"print(1)"), ("lib/helper.py", b"def f(): pass")]);

    svc.unpack_on_ingest(&project_id, archive).await.unwrap();
    let manifest = svc.publish_version(&project_id).await.unwrap();

    assert_eq!(manifest.version, 1);
    assert_eq!(manifest.file_count, 2);
    assert_eq!(manifest.total_size, "print(1)".len() as u64 + "def f(): pass".len() as u64);

    let read_back = svc.read_manifest(&project_id, VersionSelector::Latest).await.unwrap();
    assert_eq!(read_back, manifest);

    let member = svc.read_member(&project_id, 1, "main.py").await.unwrap();
    assert_eq!(member, b"print(1)");
}

#[tokio::test]
async fn publishing_twice_increments_version() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let project_id = ProjectId::new();
    svc.unpack_on_ingest(&project_id, zip_with(&[("a.py", b"1")])).await.unwrap();
    let first = svc.publish_version(&project_id).await.unwrap();
    let second = svc.publish_version(&project_id).await.unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
}

#[tokio::test]
async fn path_traversal_entry_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let project_id = ProjectId::new();
    let archive = zip_with(&[("../escape.py", b"evil")]);

    let err = svc.unpack_on_ingest(&project_id, archive).await.unwrap_err();
    assert!(matches!(err, StorageError::Validation(ExtractionRejection::IllegalPath(_))));

    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(dir.path()));
    let page = store.list(&format!("projects/{project_id}/"), None, 10).await.unwrap();
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn oversize_archive_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(dir.path()));
    let svc = ProjectArtifactService::new(store, ExtractLimits { max_total_size: 4, max_files: 100 });
    let project_id = ProjectId::new();
    let archive = zip_with(&[("big.bin", b"this is too big")]);

    let err = svc.unpack_on_ingest(&project_id, archive).await.unwrap_err();
    assert!(matches!(err, StorageError::Validation(ExtractionRejection::Oversize { .. })));
}

#[tokio::test]
async fn record_dispatch_then_mark_all_stale() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let project_id = ProjectId::new();
    svc.unpack_on_ingest(&project_id, zip_with(&[("a.py", b"x")])).await.unwrap();
    let manifest = svc.publish_version(&project_id).await.unwrap();

    let node_projects = InMemoryStore::new();
    let worker_id = grid_core::WorkerId::new();
    svc.record_dispatch(&node_projects, None, worker_id, project_id, &manifest, "intranet", 1000)
        .await
        .unwrap();

    let row = node_projects.get(&worker_id, &project_id).await.unwrap();
    assert_eq!(row.status, SyncStatus::Synced);

    svc.mark_all_stale(&node_projects, &project_id).await.unwrap();
    let row = node_projects.get(&worker_id, &project_id).await.unwrap();
    assert_eq!(row.status, SyncStatus::Stale);
}

#[tokio::test]
async fn edit_draft_increments_dirty_and_dispatch_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(dir.path());
    let projects = InMemoryStore::new();
    let node_projects = InMemoryStore::new();
    let worker_id = grid_core::WorkerId::new();

    let project_id = ProjectId::new();
    let project = grid_core::Project {
        id: project_id,
        project_type: grid_core::ProjectType::File,
        status: grid_core::ProjectStatus::Draft,
        placement: grid_core::RuntimePlacement::default(),
        execution_strategy: grid_core::ExecutionStrategy::Auto,
        bound_worker_ref: None,
        detail: grid_core::ProjectDetail::File(grid_core::FileDetail {
            file_path: "main.py".into(),
            file_hash: "h0".into(),
            entry_point: "main.py".into(),
            is_compressed: false,
            draft_manifest_key: String::new(),
            published_version: None,
            dirty: 0,
        }),
    };
    crate::repository::ProjectStore::put(&projects, project).await.unwrap();

    svc.edit_draft(&projects, &node_projects, &project_id, zip_with(&[("main.py", b"v1")])).await.unwrap();
    let after_edit = crate::repository::ProjectStore::get(&projects, &project_id).await.unwrap();
    let grid_core::ProjectDetail::File(detail) = &after_edit.detail else { panic!("expected File detail") };
    assert_eq!(detail.dirty, 1);

    let manifest = svc.publish_version(&project_id).await.unwrap();
    // This worker's row starts stale (no prior sync); the first dispatch
    // upsert path doesn't clear dirty, only a stale->synced transition does.
    node_projects
        .put(grid_core::NodeProject {
            worker_ref: worker_id,
            project_ref: project_id,
            file_hash: "old".into(),
            file_size: 0,
            transfer_method: "intranet".into(),
            synced_at_ms: 0,
            status: SyncStatus::Stale,
            sync_count: 1,
            last_used_at_ms: None,
            files: Vec::new(),
        })
        .await
        .unwrap();

    svc.record_dispatch(&node_projects, Some(&projects), worker_id, project_id, &manifest, "intranet", 2000)
        .await
        .unwrap();

    let after_dispatch = crate::repository::ProjectStore::get(&projects, &project_id).await.unwrap();
    let grid_core::ProjectDetail::File(detail) = &after_dispatch.detail else { panic!("expected File detail") };
    assert_eq!(detail.dirty, 0);
}
