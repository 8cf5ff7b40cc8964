// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway-mode reconnect policy (spec §4.7 "Reconnect"):
//!
//! - ≥3 consecutive transport failures trigger the Backoff Engine-driven
//!   reconnect loop.
//! - More than `max_auth_failures` consecutive auth errors disables retry
//!   and marks the transport permanently offline until operator
//!   intervention.
//!
//! `MAX_PENDING_RECONNECTS` resolves the open question of how many queued
//! reconnect attempts a caller may accumulate before this is itself treated
//! as a failure rather than silently unbounded retry.

use crate::error::TransportError;
use grid_core::{BackoffEngine, Kind};
use std::time::Duration;

/// Caps the number of reconnect attempts a [`ReconnectPolicy`] will queue
/// before failing fast (spec §9 open question).
pub const MAX_PENDING_RECONNECTS: usize = 64;

const FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectState {
    Healthy,
    Reconnecting,
    PermanentlyOffline,
}

pub struct ReconnectPolicy {
    backoff: BackoffEngine,
    consecutive_failures: u32,
    consecutive_auth_failures: u32,
    pending_reconnects: usize,
    max_auth_failures: u32,
    state: ReconnectState,
}

impl ReconnectPolicy {
    pub fn new(backoff: BackoffEngine, max_auth_failures: u32) -> Self {
        Self {
            backoff,
            consecutive_failures: 0,
            consecutive_auth_failures: 0,
            pending_reconnects: 0,
            max_auth_failures,
            state: ReconnectState::Healthy,
        }
    }

    pub fn state(&self) -> ReconnectState {
        self.state
    }

    /// Clears a permanently-offline state. The only legal way out of it
    /// (spec §4.7 "until operator intervention").
    pub fn reset_after_operator_intervention(&mut self) {
        self.consecutive_failures = 0;
        self.consecutive_auth_failures = 0;
        self.pending_reconnects = 0;
        self.backoff.reset();
        self.state = ReconnectState::Healthy;
    }

    /// Record a transport outcome and decide the next action. Returns the
    /// delay to wait before retrying, or an error if retry is no longer
    /// permitted.
    pub fn on_result(&mut self, result: &Result<(), TransportError>) -> Result<Option<Duration>, TransportError> {
        if self.state == ReconnectState::PermanentlyOffline {
            return Err(TransportError::PermanentlyOffline);
        }

        let Err(err) = result else {
            self.consecutive_failures = 0;
            self.consecutive_auth_failures = 0;
            self.pending_reconnects = 0;
            self.backoff.reset();
            self.state = ReconnectState::Healthy;
            return Ok(None);
        };

        if matches!(err, TransportError::AuthFailed(_)) {
            self.consecutive_auth_failures += 1;
            if self.consecutive_auth_failures > self.max_auth_failures {
                self.state = ReconnectState::PermanentlyOffline;
                return Err(TransportError::PermanentlyOffline);
            }
            return Err(TransportError::AuthFailed(format!(
                "auth failure {}/{}",
                self.consecutive_auth_failures, self.max_auth_failures
            )));
        }

        self.consecutive_failures += 1;
        if self.consecutive_failures < FAILURE_THRESHOLD {
            return Ok(None);
        }

        self.pending_reconnects += 1;
        if self.pending_reconnects > MAX_PENDING_RECONNECTS {
            return Err(TransportError::ReconnectLimitExceeded(MAX_PENDING_RECONNECTS));
        }
        self.state = ReconnectState::Reconnecting;
        Ok(Some(self.backoff.next()))
    }
}

/// `Kind::AuthFailure` is the only error class excluded from the reconnect
/// loop's generic retry path (spec §4.7); callers should check this before
/// feeding an error into [`ReconnectPolicy::on_result`] if they want to
/// short-circuit before incrementing the generic failure counter.
pub fn is_auth_failure(kind: Kind) -> bool {
    kind == Kind::AuthFailure
}

#[cfg(test)]
#[path = "reconnect_tests.rs"]
mod tests;
