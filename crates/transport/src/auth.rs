// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable Worker authentication (spec §6 "Worker transport (Intranet
//! mode)" / §4.7 "Authentication"). Shared by both transport modes; each
//! injects the resulting headers/metadata into its own outbound call shape.

use crate::error::TransportError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AuthScheme {
    ApiKey { key: String },
    Mtls,
    Hmac { api_key: String, secret_key: String },
    Jwt { token: String },
}

/// Header/metadata pairs to attach to one outbound call. `Mtls` contributes
/// none here — its identity is carried by the TLS handshake itself.
pub struct AuthHeaders(pub Vec<(&'static str, String)>);

impl AuthScheme {
    /// Build the headers for a call carrying `payload` as its signed body
    /// (only meaningful for `Hmac`; other schemes ignore `payload`).
    pub fn headers_for(&self, payload: &serde_json::Value) -> Result<AuthHeaders, TransportError> {
        match self {
            AuthScheme::ApiKey { key } => Ok(AuthHeaders(vec![("x-api-key", key.clone())])),
            AuthScheme::Mtls => Ok(AuthHeaders(Vec::new())),
            AuthScheme::Jwt { token } => Ok(AuthHeaders(vec![("authorization", format!("Bearer {token}"))])),
            AuthScheme::Hmac { api_key, secret_key } => {
                let timestamp = crate::now_ms().to_string();
                let nonce = grid_core::short(&nanoid::nanoid!(21), 16).to_string();
                let signature = grid_wire::sign(secret_key, &timestamp, &nonce, payload)
                    .map_err(|e| TransportError::AuthFailed(e.to_string()))?;
                Ok(AuthHeaders(vec![
                    ("x-api-key", api_key.clone()),
                    ("x-timestamp", timestamp),
                    ("x-nonce", nonce),
                    ("x-signature", signature),
                ]))
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
