// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! grid-wire: on-the-wire shapes shared by every transport surface — the
//! generated Gateway gRPC stubs (spec §6 "Worker transport (Gateway mode)"),
//! the WebSocket JSON message shapes (spec §6 "WebSocket API"), the
//! Intranet HMAC signing scheme (spec §6 "Worker transport (Intranet
//! mode)"), and the length-prefixed IPC framing used between `grid` and
//! `gridd` for local operator commands.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod grpc;
pub mod hmac_sig;
pub mod ipc;
pub mod ws;

pub use hmac_sig::{sign, verify, SignatureError};
pub use ipc::{decode, encode, read_message, write_message, IpcError, Request, Response};
pub use ws::WsMessage;
