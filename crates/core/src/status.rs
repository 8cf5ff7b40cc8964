// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-axis execution state machine (spec §4.9, component C9).
//!
//! The source system encoded dispatch and runtime status as two parallel
//! string columns updated from many code paths (spec §9 "two-axis state").
//! Here the aggregate is a tagged sum whose variants are the only public
//! constructors for a `Run`'s status; the two-axis columns exist only as a
//! serialization shape at the storage boundary ([`DispatchAxis`] /
//! [`RuntimeAxis`] are private outside this module).

use serde::{Deserialize, Serialize};

/// The dispatch-axis value, as persisted at the repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchAxis {
    Pending,
    Dispatching,
    Queued,
    Failed,
    Timeout,
}

/// The runtime-axis value, as persisted at the repository boundary.
/// Only meaningful once the dispatch axis has reached [`DispatchAxis::Queued`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeAxis {
    Running,
    Success,
    Failed,
    Cancelled,
    Timeout,
}

/// A reason code attached to a terminal `Failed` status, preserved from the
/// §7 error taxonomy so the Run's `error_message` can be built without
/// re-deriving the cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason(pub String);

impl From<&str> for FailureReason {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FailureReason {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The aggregate status of a Run. This is the only type code outside this
/// module is allowed to hold; [`ExecutionStatus::apply`] is the sole public
/// constructor for a transitioned state, so the invariant "a terminal Run is
/// immutable" is enforced the moment a caller tries to apply a transition
/// that doesn't exist below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Pending,
    Dispatching,
    Queued,
    Running,
    Success,
    Failed(FailureReason),
    Timeout,
    Cancelled,
}

impl ExecutionStatus {
    /// An event that can legally advance a Run's status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Success
                | ExecutionStatus::Failed(_)
                | ExecutionStatus::Timeout
                | ExecutionStatus::Cancelled
        )
    }

    /// True once the dispatch axis has reached `queued` or later, i.e. the
    /// runtime axis is live (spec §3 invariant 1).
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, ExecutionStatus::Pending | ExecutionStatus::Dispatching)
    }

    /// Split back into the two-axis storage shape (spec §4.9 table),
    /// for writing a `RunRow` at the repository boundary.
    pub fn to_axes(&self) -> (DispatchAxis, Option<RuntimeAxis>) {
        match self {
            ExecutionStatus::Pending => (DispatchAxis::Pending, None),
            ExecutionStatus::Dispatching => (DispatchAxis::Dispatching, None),
            ExecutionStatus::Queued => (DispatchAxis::Queued, None),
            ExecutionStatus::Running => (DispatchAxis::Queued, Some(RuntimeAxis::Running)),
            ExecutionStatus::Success => (DispatchAxis::Queued, Some(RuntimeAxis::Success)),
            ExecutionStatus::Failed(_) => (DispatchAxis::Failed, None),
            ExecutionStatus::Timeout => (DispatchAxis::Timeout, None),
            ExecutionStatus::Cancelled => (DispatchAxis::Queued, Some(RuntimeAxis::Cancelled)),
        }
    }

    /// Rebuild from the two-axis storage shape (spec §4.9 table). Returns
    /// `None` for combinations the table does not define (e.g. dispatch
    /// `failed` with a runtime axis set).
    pub fn from_axes(dispatch: DispatchAxis, runtime: Option<RuntimeAxis>) -> Option<Self> {
        match (dispatch, runtime) {
            (DispatchAxis::Pending, None) => Some(ExecutionStatus::Pending),
            (DispatchAxis::Dispatching, None) => Some(ExecutionStatus::Dispatching),
            (DispatchAxis::Queued, None) => Some(ExecutionStatus::Queued),
            (DispatchAxis::Failed, None) => Some(ExecutionStatus::Failed(FailureReason(
                "dispatch_failed".to_string(),
            ))),
            (DispatchAxis::Timeout, None) => Some(ExecutionStatus::Timeout),
            (DispatchAxis::Queued, Some(RuntimeAxis::Running)) => Some(ExecutionStatus::Running),
            (DispatchAxis::Queued, Some(RuntimeAxis::Success)) => Some(ExecutionStatus::Success),
            (DispatchAxis::Queued, Some(RuntimeAxis::Failed)) => {
                Some(ExecutionStatus::Failed(FailureReason("runtime_failed".to_string())))
            }
            (DispatchAxis::Queued, Some(RuntimeAxis::Cancelled)) => Some(ExecutionStatus::Cancelled),
            (DispatchAxis::Queued, Some(RuntimeAxis::Timeout)) => Some(ExecutionStatus::Timeout),
            _ => None,
        }
    }
}

/// An event driving a transition of [`ExecutionStatus`] (spec §4.9
/// "Transitions").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Dispatch axis: `pending -> dispatching`.
    BeginDispatch,
    /// Dispatch axis: `dispatching -> queued`.
    DispatchAccepted,
    /// Dispatch axis: `dispatching -> failed`.
    DispatchFailed(FailureReason),
    /// Dispatch axis: `dispatching -> timeout` (ACK deadline exceeded).
    DispatchTimedOut,
    /// Runtime axis: `queued -> running` (first runtime-status update).
    RuntimeStarted,
    /// Runtime axis: `running -> success`.
    RuntimeSucceeded,
    /// Runtime axis: `running -> failed`.
    RuntimeFailed(FailureReason),
    /// Runtime axis: `running -> cancelled`.
    RuntimeCancelled,
    /// Runtime axis: `running -> timeout` (run-heartbeat-limit reaper).
    RuntimeTimedOut,
}

/// Error returned when a [`Transition`] does not apply to the current
/// [`ExecutionStatus`] (spec §8 invariant 2: a terminal Run's status never
/// changes except via administrative purge, which this type does not model).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {transition:?} to a Run in {from:?}")]
pub struct IllegalTransition {
    pub from: ExecutionStatus,
    pub transition: Transition,
}

impl ExecutionStatus {
    /// The only way to move a Run's status forward. Returns
    /// [`IllegalTransition`] rather than silently clamping, so a
    /// `state_conflict` error (spec §7) can be raised by the caller.
    pub fn apply(self, transition: Transition) -> Result<Self, IllegalTransition> {
        use ExecutionStatus::*;
        use Transition::*;
        let result = match (&self, &transition) {
            (Pending, BeginDispatch) => Some(Dispatching),
            (Dispatching, DispatchAccepted) => Some(Queued),
            (Dispatching, DispatchFailed(reason)) => Some(Failed(reason.clone())),
            (Dispatching, DispatchTimedOut) => Some(Timeout),
            (Queued, RuntimeStarted) => Some(Running),
            (Running, RuntimeSucceeded) => Some(Success),
            (Running, RuntimeFailed(reason)) => Some(Failed(reason.clone())),
            (Running, RuntimeCancelled) => Some(Cancelled),
            (Running, RuntimeTimedOut) => Some(Timeout),
            _ => None,
        };
        result.ok_or(IllegalTransition {
            from: self,
            transition,
        })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
