// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the object store, log pipeline, and project artifact
//! service (spec §7).

use grid_core::{HasKind, Kind};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("transient object-store failure: {0}")]
    TransientNetwork(String),
    #[error("archive rejected: {0}")]
    Validation(ExtractionRejection),
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("internal storage error: {0}")]
    Internal(String),
}

/// Precise rejection reason for bounded archive extraction (spec §4.4
/// "Failure").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionRejection {
    #[error("extracted size {extracted} exceeds limit {limit}")]
    Oversize { extracted: u64, limit: u64 },
    #[error("file count {count} exceeds limit {limit}")]
    TooManyFiles { count: usize, limit: usize },
    #[error("illegal path in archive: {0}")]
    IllegalPath(String),
    #[error("symlink present in archive: {0}")]
    SymlinkPresent(String),
    #[error("unsupported archive format")]
    UnsupportedFormat,
}

impl HasKind for StorageError {
    fn kind(&self) -> Kind {
        match self {
            StorageError::NotFound(_) => Kind::Validation,
            StorageError::TransientNetwork(_) => Kind::TransientNetwork,
            StorageError::Validation(_) => Kind::Validation,
            StorageError::ChecksumMismatch { .. } => Kind::Validation,
            StorageError::Io(_) => Kind::Internal,
            StorageError::Internal(_) => Kind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
