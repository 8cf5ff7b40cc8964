// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    transient = { Kind::TransientNetwork, true },
    quota = { Kind::QuotaExceeded, true },
    auth = { Kind::AuthFailure, false },
    validation = { Kind::Validation, false },
    state_conflict = { Kind::StateConflict, false },
    worker_unavailable = { Kind::WorkerUnavailable, false },
    timeout = { Kind::Timeout, false },
    internal = { Kind::Internal, false },
)]
fn locally_recoverable_matches_spec(kind: Kind, expected: bool) {
    assert_eq!(kind.is_locally_recoverable(), expected);
}

#[test]
fn display_matches_wire_names() {
    assert_eq!(Kind::TransientNetwork.to_string(), "transient_network");
    assert_eq!(Kind::WorkerUnavailable.to_string(), "worker_unavailable");
}

#[test]
fn kind_round_trips_through_json() {
    for kind in [
        Kind::TransientNetwork,
        Kind::AuthFailure,
        Kind::QuotaExceeded,
        Kind::Validation,
        Kind::StateConflict,
        Kind::WorkerUnavailable,
        Kind::Timeout,
        Kind::Internal,
    ] {
        let json = serde_json::to_string(&kind).unwrap();
        let back: Kind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, back);
    }
}
