// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intranet transport HMAC signing scheme (spec §6 "Worker transport
//! (Intranet mode)"):
//!
//! `X-Signature = hex(HMAC-SHA256(secret_key, timestamp + "." + nonce + "." +
//! json_compact(payload, sort_keys=True)))`

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("secret key has invalid length for HMAC-SHA256")]
    InvalidKeyLength,
    #[error("signature does not match")]
    Mismatch,
    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Serializes `payload` to compact JSON with sorted keys (via a `BTreeMap`
/// round-trip through `serde_json::Value`) and returns the hex-encoded
/// HMAC-SHA256 signature over `{timestamp}.{nonce}.{payload}`.
pub fn sign(
    secret_key: &str,
    timestamp: &str,
    nonce: &str,
    payload: &serde_json::Value,
) -> Result<String, SignatureError> {
    let canonical = canonicalize(payload)?;
    let message = format!("{timestamp}.{nonce}.{canonical}");
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|_| SignatureError::InvalidKeyLength)?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a signature previously produced by [`sign`]. Returns
/// [`SignatureError::Mismatch`] on any mismatch (length or content), never
/// leaking which byte differs.
pub fn verify(
    secret_key: &str,
    timestamp: &str,
    nonce: &str,
    payload: &serde_json::Value,
    signature: &str,
) -> Result<(), SignatureError> {
    let canonical = canonicalize(payload)?;
    let message = format!("{timestamp}.{nonce}.{canonical}");
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|_| SignatureError::InvalidKeyLength)?;
    mac.update(message.as_bytes());
    let expected = hex::decode(signature).map_err(|_| SignatureError::Mismatch)?;
    mac.verify_slice(&expected).map_err(|_| SignatureError::Mismatch)
}

fn canonicalize(payload: &serde_json::Value) -> Result<String, SignatureError> {
    let sorted: serde_json::Value =
        serde_json::from_str(&sort_keys(payload).to_string())?;
    Ok(sorted.to_string())
}

fn sort_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, serde_json::Value> =
                map.iter().map(|(k, v)| (k.clone(), sort_keys(v))).collect();
            serde_json::to_value(sorted).unwrap_or(serde_json::Value::Null)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sort_keys).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
#[path = "hmac_sig_tests.rs"]
mod tests;
