// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use grid_core::TaskId;

fn transport() -> IntranetTransport {
    IntranetTransport::new(AuthScheme::ApiKey { key: "k".into() })
}

fn report(task_id: TaskId) -> ResultReport {
    ResultReport {
        worker_id: WorkerId::new(),
        task_id,
        status: "success".into(),
        exit_code: Some(0),
        started_at_ms: 0,
        finished_at_ms: 10,
        duration_ms: 10,
        data: None,
    }
}

#[tokio::test]
async fn report_result_is_idempotent_per_task() {
    let transport = transport();
    let mut r = report(TaskId::new());
    transport.report_result(r.clone()).await.unwrap();
    r.status = "failed".into();
    transport.report_result(r).await.unwrap();
    assert_eq!(transport.result_cache.len(), 1);
}

#[tokio::test]
async fn poll_control_is_always_empty_for_push_mode() {
    let transport = transport();
    let result = transport.poll_control(&WorkerId::new(), Duration::from_millis(10)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn dispatch_times_out_against_an_unroutable_host() {
    let transport = transport();
    let worker = grid_core::Worker::builder().host("203.0.113.1").port(9).build();
    let task = TaskPayload {
        task_id: TaskId::new(),
        project_ref: "prj-1".into(),
        entry_point: "main.py".into(),
        task_type: "code".into(),
        timeout_seconds: 5,
        payload: serde_json::json!({}),
    };
    let outcome = transport.dispatch(&worker, task, Duration::from_millis(50)).await;
    assert!(outcome.is_err());
}
