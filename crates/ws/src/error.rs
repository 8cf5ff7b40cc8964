// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the WebSocket Hub (spec §7).

use grid_core::{HasKind, Kind};

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("global connection quota exceeded")]
    GlobalQuotaExceeded,
    #[error("no such execution room: {0}")]
    NotFound(String),
}

impl HasKind for HubError {
    fn kind(&self) -> Kind {
        match self {
            HubError::GlobalQuotaExceeded => Kind::QuotaExceeded,
            HubError::NotFound(_) => Kind::Validation,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
