// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generated Gateway gRPC stubs (spec §6 "Worker transport (Gateway
//! mode)"), built from `proto/gateway.proto` via `tonic-build`.

#![allow(clippy::all)]

tonic::include_proto!("grid.gateway.v1");
