// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket Hub (spec §4.6, component C6): per-execution connection pool,
//! server-driven heartbeats, and bounded fan-out, mounted over `axum`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod hub;
pub mod server;

pub use error::HubError;
pub use hub::{ClosedConnection, Hub, HubConfig, SharedHub};
pub use server::router;

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
