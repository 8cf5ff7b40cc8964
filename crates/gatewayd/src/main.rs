// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grid-gatewayd`, the standalone deployment of the Gateway gRPC surface
//! for Internet-reachable Workers (spec §2). Shares `grid-daemon`'s
//! [`grid_daemon::state::AppState`] and [`grid_daemon::grpc_service`] — the
//! only difference from `gridd` is that this binary always runs in Gateway
//! transport mode and exposes nothing but the gRPC surface, so it can sit
//! behind a public load balancer without also exposing the Intranet HTTP
//! push endpoints or the local IPC control socket.

use grid_daemon::config::{Config, TransportMode};
use grid_daemon::grpc_service::GatewayServiceImpl;
use grid_daemon::state::AppState;
use grid_storage::FsObjectStore;
use grid_transport::{GatewayTransport, Transport};
use grid_wire::grpc::gateway_service_server::GatewayServiceServer;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).init();

    let config_path = std::env::var("GRID_CONFIG_PATH").map(std::path::PathBuf::from).ok();
    let mut config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    config.transport_mode = TransportMode::Gateway;

    let object_store = Arc::new(FsObjectStore::new(config.object_store_root.clone()));
    let gateway = Arc::new(GatewayTransport::new());
    let transport: Arc<dyn Transport> = gateway.clone();
    let state = Arc::new(AppState::new(config.clone(), transport, Some(gateway), object_store));

    let socket_addr: std::net::SocketAddr = config.grpc_addr.parse()?;
    info!(addr = %socket_addr, "grid-gatewayd listening");
    let service = GatewayServiceImpl::new(state);
    if let Err(e) =
        tonic::transport::Server::builder().add_service(GatewayServiceServer::new(service)).serve(socket_addr).await
    {
        error!(error = %e, "grid-gatewayd terminated");
    }
    Ok(())
}
