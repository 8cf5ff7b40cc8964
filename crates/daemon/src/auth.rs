// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-side counterpart to [`grid_transport::AuthScheme::headers_for`]:
//! verifies an inbound Worker push against the credentials `gridd` issued it
//! at registration time (spec §4.7 "Authentication", §6 "Worker transport
//! (Intranet mode)").
//!
//! The wire payload names the Worker itself (`worker_id`/`task_id.worker_ref`
//! fields), so there is no separate worker-id header to trust independently
//! — the claimed identity is only as good as the signature over the body
//! that carries it.

use crate::error::IngestError;
use axum::http::HeaderMap;
use grid_core::{Worker, WorkerId};
use grid_storage::WorkerStore;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Validate `x-api-key` (and, when present, the full HMAC envelope of
/// `x-timestamp`/`x-nonce`/`x-signature`) against `worker.credentials`.
pub fn verify_headers(headers: &HeaderMap, worker: &Worker, payload: &serde_json::Value) -> Result<(), IngestError> {
    let api_key = header_str(headers, "x-api-key").ok_or_else(|| IngestError::Unauthorized("missing x-api-key".into()))?;
    if api_key != worker.credentials.api_key {
        return Err(IngestError::Unauthorized("api key mismatch".into()));
    }

    let (Some(timestamp), Some(nonce), Some(signature)) = (
        header_str(headers, "x-timestamp"),
        header_str(headers, "x-nonce"),
        header_str(headers, "x-signature"),
    ) else {
        // ApiKey-only scheme: the key itself is the whole proof.
        return Ok(());
    };

    grid_wire::verify(&worker.credentials.secret_key, timestamp, nonce, payload, signature)
        .map_err(|e| IngestError::Unauthorized(e.to_string()))
}

/// Look the Worker up and verify the request in one call, for handlers that
/// only have the claimed `worker_id` and the raw headers/body on hand.
pub async fn authenticate(
    store: &dyn WorkerStore,
    worker_id: &WorkerId,
    headers: &HeaderMap,
    payload: &serde_json::Value,
) -> Result<Worker, IngestError> {
    let worker = store.get(worker_id).await?;
    verify_headers(headers, &worker, payload)?;
    Ok(worker)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
