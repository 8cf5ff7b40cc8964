// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the Scheduler and Node Registry (spec §7).

use grid_core::{HasKind, Kind};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("task not active or already in flight")]
    NotEligible,
    #[error("no eligible worker: {0}")]
    WorkerUnavailable(String),
    #[error("concurrency limit reached for this task")]
    ConcurrencyLimitReached,
    #[error(transparent)]
    Storage(#[from] grid_storage::StorageError),
    #[error(transparent)]
    Transport(#[from] grid_transport::TransportError),
    #[error("illegal status transition: {0}")]
    IllegalTransition(#[from] grid_core::IllegalTransition),
    #[error("internal scheduler error: {0}")]
    Internal(String),
}

impl HasKind for SchedulerError {
    fn kind(&self) -> Kind {
        match self {
            SchedulerError::NotEligible => Kind::StateConflict,
            SchedulerError::WorkerUnavailable(_) => Kind::WorkerUnavailable,
            SchedulerError::ConcurrencyLimitReached => Kind::StateConflict,
            SchedulerError::Storage(e) => e.kind(),
            SchedulerError::Transport(e) => e.kind(),
            SchedulerError::IllegalTransition(_) => Kind::StateConflict,
            SchedulerError::Internal(_) => Kind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
