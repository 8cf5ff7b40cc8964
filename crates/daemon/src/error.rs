// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingestion-layer error taxonomy (spec §7), shared by the HTTP (Intranet)
//! and gRPC (Gateway) handlers so both map a domain failure to the same
//! wire status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grid_core::{HasKind, Kind};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Storage(#[from] grid_storage::StorageError),
    #[error(transparent)]
    Transport(#[from] grid_transport::TransportError),
    #[error(transparent)]
    Scheduler(#[from] grid_scheduler::SchedulerError),
    #[error(transparent)]
    Transition(#[from] grid_core::IllegalTransition),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl HasKind for IngestError {
    fn kind(&self) -> Kind {
        match self {
            IngestError::Storage(e) => e.kind(),
            IngestError::Transport(e) => e.kind(),
            IngestError::Scheduler(e) => e.kind(),
            IngestError::Transition(_) => Kind::StateConflict,
            IngestError::Unauthorized(_) => Kind::AuthFailure,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            Kind::AuthFailure => StatusCode::UNAUTHORIZED,
            Kind::Validation => StatusCode::BAD_REQUEST,
            Kind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Kind::StateConflict => StatusCode::CONFLICT,
            Kind::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Kind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Kind::TransientNetwork | Kind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl From<IngestError> for tonic::Status {
    fn from(err: IngestError) -> Self {
        let code = match err.kind() {
            Kind::AuthFailure => tonic::Code::Unauthenticated,
            Kind::Validation => tonic::Code::InvalidArgument,
            Kind::QuotaExceeded => tonic::Code::ResourceExhausted,
            Kind::StateConflict => tonic::Code::FailedPrecondition,
            Kind::WorkerUnavailable => tonic::Code::Unavailable,
            Kind::Timeout => tonic::Code::DeadlineExceeded,
            Kind::TransientNetwork | Kind::Internal => tonic::Code::Internal,
        };
        tonic::Status::new(code, err.to_string())
    }
}
