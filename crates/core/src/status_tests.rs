// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn happy_path_dispatch_to_success() {
    let status = ExecutionStatus::Pending;
    let status = status.apply(Transition::BeginDispatch).unwrap();
    assert_eq!(status, ExecutionStatus::Dispatching);
    let status = status.apply(Transition::DispatchAccepted).unwrap();
    assert_eq!(status, ExecutionStatus::Queued);
    let status = status.apply(Transition::RuntimeStarted).unwrap();
    assert_eq!(status, ExecutionStatus::Running);
    let status = status.apply(Transition::RuntimeSucceeded).unwrap();
    assert_eq!(status, ExecutionStatus::Success);
    assert!(status.is_terminal());
}

#[test]
fn runtime_only_applies_once_queued() {
    let status = ExecutionStatus::Pending;
    let err = status.apply(Transition::RuntimeStarted).unwrap_err();
    assert_eq!(err.from, ExecutionStatus::Pending);
}

#[test]
fn terminal_states_reject_every_transition() {
    for terminal in [
        ExecutionStatus::Success,
        ExecutionStatus::Failed(FailureReason::from("boom")),
        ExecutionStatus::Timeout,
        ExecutionStatus::Cancelled,
    ] {
        assert!(terminal.is_terminal());
        for transition in [
            Transition::BeginDispatch,
            Transition::DispatchAccepted,
            Transition::RuntimeStarted,
            Transition::RuntimeSucceeded,
        ] {
            assert!(terminal.clone().apply(transition).is_err());
        }
    }
}

#[test]
fn dispatch_failure_paths() {
    let status = ExecutionStatus::Pending.apply(Transition::BeginDispatch).unwrap();
    let failed = status
        .clone()
        .apply(Transition::DispatchFailed(FailureReason::from("worker_busy")))
        .unwrap();
    assert_eq!(failed, ExecutionStatus::Failed(FailureReason::from("worker_busy")));

    let timed_out = status.apply(Transition::DispatchTimedOut).unwrap();
    assert_eq!(timed_out, ExecutionStatus::Timeout);
}

#[test]
fn axes_round_trip_for_every_reachable_status() {
    let reachable = [
        ExecutionStatus::Pending,
        ExecutionStatus::Dispatching,
        ExecutionStatus::Queued,
        ExecutionStatus::Running,
        ExecutionStatus::Success,
        ExecutionStatus::Timeout,
        ExecutionStatus::Cancelled,
    ];
    for status in reachable {
        let (dispatch, runtime) = status.to_axes();
        let rebuilt = ExecutionStatus::from_axes(dispatch, runtime).unwrap();
        assert_eq!(rebuilt, status);
    }
}

#[test]
fn runtime_set_implies_dispatch_queued_invariant() {
    // Spec §8 invariant 1: if runtime_status is set, dispatch_status = queued.
    for status in [
        ExecutionStatus::Running,
        ExecutionStatus::Success,
        ExecutionStatus::Cancelled,
    ] {
        let (dispatch, runtime) = status.to_axes();
        assert!(runtime.is_some());
        assert_eq!(dispatch, DispatchAxis::Queued);
    }
}

#[test]
fn cancellation_only_reachable_from_running() {
    assert!(ExecutionStatus::Queued.apply(Transition::RuntimeCancelled).is_err());
    let running = ExecutionStatus::Queued.apply(Transition::RuntimeStarted).unwrap();
    assert_eq!(
        running.apply(Transition::RuntimeCancelled).unwrap(),
        ExecutionStatus::Cancelled
    );
}

fn any_status() -> impl proptest::strategy::Strategy<Value = ExecutionStatus> {
    use proptest::prelude::*;
    prop_oneof![
        Just(ExecutionStatus::Pending),
        Just(ExecutionStatus::Dispatching),
        Just(ExecutionStatus::Queued),
        Just(ExecutionStatus::Running),
        Just(ExecutionStatus::Success),
        any::<String>().prop_map(|reason| ExecutionStatus::Failed(FailureReason::from(reason))),
        Just(ExecutionStatus::Timeout),
        Just(ExecutionStatus::Cancelled),
    ]
}

proptest::proptest! {
    /// `to_axes`/`from_axes` is idempotent at the axis level for every
    /// status the type can hold: splitting, rebuilding, and splitting again
    /// always lands on the same pair of axes, even for `Failed` statuses
    /// whose free-text reason isn't itself part of the storage shape.
    #[test]
    fn axes_split_rebuild_split_is_idempotent(status in any_status()) {
        let axes = status.to_axes();
        let rebuilt = ExecutionStatus::from_axes(axes.0, axes.1).expect("every to_axes output round-trips");
        prop_assert_eq!(rebuilt.to_axes(), axes);
    }

    /// For every status other than `Failed` (whose exact reason text isn't
    /// carried by the two-axis shape), the round trip reproduces the
    /// original value exactly.
    #[test]
    fn axes_round_trip_is_exact_outside_failed(status in any_status()) {
        prop_assume!(!matches!(status, ExecutionStatus::Failed(_)));
        let (dispatch, runtime) = status.to_axes();
        let rebuilt = ExecutionStatus::from_axes(dispatch, runtime).unwrap();
        prop_assert_eq!(rebuilt, status);
    }
}
