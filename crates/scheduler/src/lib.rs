// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (spec §4.10, component C10), the Node Registry & Health cache
//! (C8), the execution resolver, the Control-Event Bus (C11), and the
//! trigger-evaluation helpers (cron/interval/misfire grace) that drive both.

pub mod control_bus;
pub mod error;
pub mod health;
pub mod resolver;
pub mod scheduler;
pub mod trigger;

pub use control_bus::{task_changed, task_trigger, ControlEventBus, InMemoryControlEventBus};
pub use error::SchedulerError;
pub use health::{CachedHealth, NodeEvent, NodeRegistry};
pub use resolver::{ExecutionResolver, Resolution};
pub use scheduler::{ControlScheduler, FanoutChild, FireOutcome, MasterScheduler, SchedulerShared};
pub use trigger::{next_fire_ms, within_misfire_grace};
