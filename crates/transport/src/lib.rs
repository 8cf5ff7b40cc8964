// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker Transport (spec §4.7, component C7): one `Transport` trait shared
//! by the Intranet (direct HTTP push) and Gateway (durable pull-queue)
//! modes, pluggable authentication, and the Gateway-mode reconnect policy.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod auth;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod gateway;
pub mod intranet;
pub mod reconnect;
pub mod transport;

pub use auth::{AuthHeaders, AuthScheme};
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransport;
pub use error::TransportError;
pub use gateway::{GatewayTransport, MAX_PENDING_TASKS_PER_WORKER};
pub use intranet::IntranetTransport;
pub use reconnect::{is_auth_failure, ReconnectPolicy, ReconnectState, MAX_PENDING_RECONNECTS};
pub use transport::{
    ControlEnvelope, DispatchOutcome, HeartbeatReport, LogChunk, LogLine, LogStreamKind, ResultReport, TaskPayload,
    Transport,
};

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
