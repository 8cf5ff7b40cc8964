// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the Worker Transport (spec §7).

use grid_core::{HasKind, Kind};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("dispatch not acknowledged within the ack timeout")]
    AckTimeout,
    #[error("transport connection error: {0}")]
    Connection(String),
    #[error("worker rejected the request: {0}")]
    Rejected(String),
    #[error("too many pending reconnects (limit {0})")]
    ReconnectLimitExceeded(usize),
    #[error("transport permanently offline after repeated auth failures")]
    PermanentlyOffline,
    #[error("internal transport error: {0}")]
    Internal(String),
}

impl HasKind for TransportError {
    fn kind(&self) -> Kind {
        match self {
            TransportError::AuthFailed(_) => Kind::AuthFailure,
            TransportError::AckTimeout => Kind::Timeout,
            TransportError::Connection(_) => Kind::TransientNetwork,
            TransportError::Rejected(_) => Kind::Validation,
            TransportError::ReconnectLimitExceeded(_) => Kind::Internal,
            TransportError::PermanentlyOffline => Kind::Internal,
            TransportError::Internal(_) => Kind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
