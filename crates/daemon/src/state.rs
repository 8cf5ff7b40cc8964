// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon state: every subsystem wired together, handed to both the
//! HTTP (Intranet) and gRPC (Gateway) ingestion layers and to the CLI's IPC
//! handler.

use crate::config::{Config, SchedulerRole};
use grid_scheduler::{
    ControlScheduler, ExecutionResolver, InMemoryControlEventBus, MasterScheduler, NodeRegistry, SchedulerShared,
};
use grid_storage::{InMemoryStore, LogPipeline, LogPipelineConfig, ObjectStore, ProjectArtifactService};
use grid_transport::{GatewayTransport, Transport};
use grid_ws::SharedHub;
use std::sync::Arc;

/// The Scheduler side of the process, gated at the type level on `role`
/// (spec §9 "Scheduler role: configuration, not election").
pub enum SchedulerHandle {
    Master(MasterScheduler),
    Control(ControlScheduler),
}

pub struct AppState {
    pub config: Config,
    pub store: Arc<InMemoryStore>,
    pub transport: Arc<dyn Transport>,
    /// Set only in Gateway mode: `PollTask`/`AckTask` are a Worker-pull
    /// surface the [`Transport`] trait itself doesn't model (spec §4.7
    /// table, Gateway column), so the gRPC service needs the concrete type.
    pub gateway: Option<Arc<GatewayTransport>>,
    pub health: Arc<NodeRegistry>,
    pub scheduler: SchedulerHandle,
    pub log_pipeline: Arc<LogPipeline>,
    pub artifacts: Arc<ProjectArtifactService>,
    pub hub: SharedHub,
}

impl AppState {
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        gateway: Option<Arc<GatewayTransport>>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let health = Arc::new(NodeRegistry::new(config.t_offline()));
        let resolver = ExecutionResolver::new(store.clone(), health.clone());
        let bus = Arc::new(InMemoryControlEventBus::new(config.control_bus_capacity));

        let shared = Arc::new(SchedulerShared::new(
            store.clone(),
            store.clone(),
            store.clone(),
            transport.clone(),
            resolver,
            bus.clone(),
            config.max_concurrent_tasks,
            config.ack_timeout(),
        ));

        let scheduler = match config.role {
            SchedulerRole::Master => SchedulerHandle::Master(MasterScheduler::new(shared)),
            SchedulerRole::Control => SchedulerHandle::Control(ControlScheduler::new(bus)),
        };

        let log_pipeline = Arc::new(LogPipeline::new(object_store.clone(), LogPipelineConfig::default()));
        let artifacts = Arc::new(ProjectArtifactService::new(object_store, Default::default()));
        let hub = Arc::new(grid_ws::Hub::new(grid_ws::HubConfig::default()));

        Self { config, store, transport, gateway, health, scheduler, log_pipeline, artifacts, hub }
    }

    /// The Master-role scheduler, or `None` when this process runs in
    /// control role (spec §4.10 "Role").
    pub fn master(&self) -> Option<&MasterScheduler> {
        match &self.scheduler {
            SchedulerHandle::Master(m) => Some(m),
            SchedulerHandle::Control(_) => None,
        }
    }
}
