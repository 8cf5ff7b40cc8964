// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy (spec §7).
//!
//! Every crate-local error type implements [`HasKind`] so the scheduler's
//! retry/fail/propagate decision is a match over one small enum regardless
//! of which component raised the error.

use serde::{Deserialize, Serialize};

/// Error taxonomy shared across every component boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Transport / blob-store network failure. Retried by the Backoff Engine;
    /// 3 consecutive occurrences trigger the reconnect loop.
    TransientNetwork,
    /// Authentication rejected by the peer. Not retried within the
    /// reconnect loop; counts toward `max_auth_failures`.
    AuthFailure,
    /// A quota (WS connections, log buffer) was exceeded. Not fatal; a
    /// counter is incremented and the oldest item is dropped or refused.
    QuotaExceeded,
    /// Caller-supplied input failed validation (bad path, oversize archive,
    /// illegal schedule). Never partially applied.
    Validation,
    /// A requested state transition conflicts with §4.9; caller should
    /// re-read and retry if applicable.
    StateConflict,
    /// No eligible Worker could be resolved for dispatch.
    WorkerUnavailable,
    /// Either the dispatch or the runtime axis reached a deadline.
    Timeout,
    /// Anything else. Logged with a correlation id; not retried by the
    /// transport itself.
    Internal,
}

impl Kind {
    /// Local recovery is attempted for these kinds before surfacing to the
    /// Scheduler (spec §7 "Propagation policy").
    pub fn is_locally_recoverable(self) -> bool {
        matches!(self, Kind::TransientNetwork | Kind::QuotaExceeded)
    }
}

crate::simple_display! {
    Kind {
        TransientNetwork => "transient_network",
        AuthFailure => "auth_failure",
        QuotaExceeded => "quota_exceeded",
        Validation => "validation",
        StateConflict => "state_conflict",
        WorkerUnavailable => "worker_unavailable",
        Timeout => "timeout",
        Internal => "internal",
    }
}

/// Implemented by every crate-local error enum so components can hand their
/// error taxonomy up to the Scheduler without collapsing it to a string.
pub trait HasKind {
    fn kind(&self) -> Kind;
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
