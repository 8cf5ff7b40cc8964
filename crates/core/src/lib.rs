// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! grid-core: domain types and pure-logic components shared by every other
//! crate in the workspace — the Task/Run/Worker/Project data model (spec
//! §3), the Execution State Machine (C9), the Backoff Engine (C2), the
//! Receipt Cache (C1), and the control-event record shape (C11).

pub mod macros;

pub mod backoff;
pub mod clock;
pub mod control_event;
pub mod error;
pub mod id;
pub mod project;
pub mod receipt;
pub mod run;
pub mod snapshot;
pub mod status;
pub mod task;
pub mod worker;

pub use backoff::{BackoffConfig, BackoffEngine, DefaultJitter, JitterSource};
pub use clock::{Clock, FakeClock, SystemClock};
pub use control_event::{BoundedEventLog, ControlEvent, ControlEventKind};
pub use error::{HasKind, Kind};
pub use id::short;
pub use project::{
    CodeDetail, CrawlerEngine, FileDetail, NodeProject, PaginationConfig, Project, ProjectDetail,
    ProjectId, ProjectStatus, ProjectType, RuleDetail, RuntimePlacement, SyncStatus, TrackedFile,
};
pub use receipt::{KeyedReceiptCache, ReceiptCache};
pub use run::{Run, RunId};
#[cfg(any(test, feature = "test-support"))]
pub use run::RunBuilder;
pub use snapshot::Snapshot;
pub use status::{DispatchAxis, ExecutionStatus, FailureReason, IllegalTransition, RuntimeAxis, Transition};
pub use task::{ExecutionStrategy, RetryPolicy, Schedule, Task, TaskId, TaskType};
#[cfg(any(test, feature = "test-support"))]
pub use task::TaskBuilder;
pub use worker::{Worker, WorkerCredentials, WorkerId, WorkerMetrics, WorkerStatus};
#[cfg(any(test, feature = "test-support"))]
pub use worker::WorkerBuilder;
