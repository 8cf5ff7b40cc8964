// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn task_payload_roundtrips_through_json() {
    let payload = TaskPayload {
        task_id: TaskId::new(),
        project_ref: "prj-1".into(),
        entry_point: "main.py".into(),
        task_type: "code".into(),
        timeout_seconds: 60,
        payload: serde_json::json!({"k": "v"}),
    };
    let encoded = serde_json::to_string(&payload).unwrap();
    let decoded: TaskPayload = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.task_id, payload.task_id);
    assert_eq!(decoded.entry_point, "main.py");
}

#[test]
fn control_envelope_optional_fields_omit_when_absent() {
    let envelope = ControlEnvelope {
        receipt_id: "r1".into(),
        control_type: "cancel".into(),
        request_id: "req-1".into(),
        task_id: None,
        run_id: Some("run-1".into()),
        reason: None,
        payload: None,
    };
    let encoded = serde_json::to_string(&envelope).unwrap();
    let decoded: ControlEnvelope = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.run_id.as_deref(), Some("run-1"));
    assert!(decoded.task_id.is_none());
}
