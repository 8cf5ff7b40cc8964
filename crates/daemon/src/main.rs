// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gridd`, the Master/Control scheduler daemon (spec §1 OVERVIEW).
//!
//! Binds the Intranet HTTP surface, the Gateway gRPC surface, the
//! WebSocket log-tail surface, and the local IPC control socket, then
//! drives the trigger-evaluation and health-scan loops until told to stop.

use clap::Parser;
use grid_daemon::config::{Config, TransportMode};
use grid_daemon::grpc_service::GatewayServiceImpl;
use grid_daemon::state::AppState;
use grid_daemon::{env, http, ipc_server};
use grid_storage::{FsObjectStore, TaskStore};
use grid_transport::{AuthScheme, GatewayTransport, IntranetTransport, Transport};
use grid_wire::grpc::gateway_service_server::GatewayServiceServer;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gridd", about = "Master/Control scheduler daemon")]
struct Cli {
    /// Path to the daemon's TOML config file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(env::config_path);
    let config = Config::load(&config_path)?;

    let _log_guard = setup_logging();
    info!(role = ?config.role, transport_mode = ?config.transport_mode, "starting gridd");

    let object_store = Arc::new(FsObjectStore::new(config.object_store_root.clone()));

    let (transport, gateway): (Arc<dyn Transport>, Option<Arc<GatewayTransport>>) = match config.transport_mode {
        TransportMode::Intranet => {
            let auth = intranet_auth_scheme();
            (Arc::new(IntranetTransport::new(auth)), None)
        }
        TransportMode::Gateway => {
            let gateway = Arc::new(GatewayTransport::new());
            (gateway.clone(), Some(gateway))
        }
    };

    let state = Arc::new(AppState::new(config.clone(), transport, gateway, object_store));

    let http_handle = tokio::spawn(serve_http(state.clone(), config.http_addr.clone()));
    let grpc_handle = tokio::spawn(serve_grpc(state.clone(), config.grpc_addr.clone()));
    spawn_trigger_loop(state.clone());
    spawn_retry_loop(state.clone());
    spawn_health_scan(state.clone());

    let socket_path = env::ipc_socket_path();
    let ipc_state = state.clone();
    let ipc_handle = tokio::spawn(async move {
        if let Err(e) = ipc_server::serve(ipc_state, &socket_path).await {
            error!(error = %e, "ipc control socket terminated");
        }
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    let closed = state.hub.shutdown();
    if !closed.is_empty() {
        info!(connections = closed.len(), "closed websocket connections for shutdown");
    }
    http_handle.abort();
    grpc_handle.abort();
    ipc_handle.abort();
    info!("gridd stopped");
    Ok(())
}

fn intranet_auth_scheme() -> AuthScheme {
    match std::env::var("GRID_AUTH_SCHEME").as_deref() {
        Ok("hmac") => AuthScheme::Hmac {
            api_key: std::env::var("GRID_AUTH_API_KEY").unwrap_or_default(),
            secret_key: std::env::var("GRID_AUTH_SECRET_KEY").unwrap_or_default(),
        },
        Ok("jwt") => AuthScheme::Jwt { token: std::env::var("GRID_AUTH_TOKEN").unwrap_or_default() },
        Ok("mtls") => AuthScheme::Mtls,
        _ => AuthScheme::ApiKey { key: std::env::var("GRID_AUTH_API_KEY").unwrap_or_default() },
    }
}

async fn serve_http(state: Arc<AppState>, addr: String) {
    let router = http::router(state);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, addr = %addr, "failed to bind http listener");
            return;
        }
    };
    info!(addr = %addr, "intranet http surface listening");
    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "http server terminated");
    }
}

async fn serve_grpc(state: Arc<AppState>, addr: String) {
    let socket_addr: std::net::SocketAddr = match addr.parse() {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, addr = %addr, "invalid grpc bind address");
            return;
        }
    };
    info!(addr = %addr, "gateway grpc surface listening");
    let service = GatewayServiceImpl::new(state);
    if let Err(e) = tonic::transport::Server::builder()
        .add_service(GatewayServiceServer::new(service))
        .serve(socket_addr)
        .await
    {
        error!(error = %e, "grpc server terminated");
    }
}

/// Evaluate Task schedules once a second: a Task whose `next_run_ms` has
/// passed gets fired through the Master scheduler, or published as a trigger
/// event for Control-role daemons to pick up.
fn spawn_trigger_loop(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let now = now_ms();
            let tasks = match TaskStore::list_active(state.store.as_ref()).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(error = %e, "failed to list active tasks for trigger evaluation");
                    continue;
                }
            };
            for mut task in tasks {
                let Some(fire_at) = task.next_run_ms else { continue };
                if fire_at > now {
                    continue;
                }
                let task_id = task.id;
                if let Some(master) = state.master() {
                    if let Err(e) = master.fire(task_id).await {
                        warn!(error = %e, task_id = %task_id, "trigger fire failed");
                    }
                }
                task.next_run_ms = grid_scheduler::trigger::next_fire_ms(&task.schedule, now);
                if let Err(e) = TaskStore::put(state.store.as_ref(), task).await {
                    warn!(error = %e, task_id = %task_id, "failed to persist next fire time");
                }
            }
        }
    });
}

/// Drive retry orchestration and orphan reaping for Master-role daemons
/// (spec §4.10 "Retry orchestration", §4.9 "Orphans"): each tick, reap Runs
/// stuck in `dispatching` past the stall limit, then find the latest
/// terminal Failed/Timeout Run for every active task, schedule its backoff
/// delay once, and re-fire once that delay elapses.
fn spawn_retry_loop(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let mut scheduled: std::collections::HashMap<grid_core::TaskId, (grid_core::RunId, u64)> =
            std::collections::HashMap::new();
        loop {
            ticker.tick().await;
            let Some(master) = state.master() else { continue };
            let now = now_ms();

            let tasks = match TaskStore::list_active(state.store.as_ref()).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(error = %e, "failed to list active tasks for retry evaluation");
                    continue;
                }
            };

            for task in &tasks {
                if let Err(e) = master.reap_stalled(&task.id, now).await {
                    warn!(error = %e, task_id = %task.id, "failed to reap stalled runs");
                }

                let runs = match grid_storage::RunStore::list_for_task(state.store.as_ref(), &task.id).await {
                    Ok(runs) => runs,
                    Err(e) => {
                        warn!(error = %e, task_id = %task.id, "failed to list runs for retry evaluation");
                        continue;
                    }
                };
                let Some(latest) = runs.into_iter().max_by_key(|r| r.attempt) else { continue };
                if !matches!(latest.status, grid_core::ExecutionStatus::Failed(_) | grid_core::ExecutionStatus::Timeout) {
                    scheduled.remove(&task.id);
                    continue;
                }

                match scheduled.get(&task.id) {
                    Some((run_id, fire_at)) if *run_id == latest.id => {
                        if now >= *fire_at {
                            scheduled.remove(&task.id);
                            if let Err(e) = master.fire(task.id).await {
                                warn!(error = %e, task_id = %task.id, "retry fire failed");
                            }
                        }
                    }
                    _ => {
                        if let Some(delay) = master.next_retry_delay(task, &latest) {
                            scheduled.insert(task.id, (latest.id, now + delay.as_millis() as u64));
                        } else {
                            scheduled.remove(&task.id);
                        }
                    }
                }
            }
        }
    });
}

/// Sweep the Node Registry for Workers that have gone silent (spec §4.8
/// "Smart scan", 3-second resolution).
fn spawn_health_scan(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(3));
        loop {
            ticker.tick().await;
            let events = state.health.scan(now_ms());
            for event in events {
                info!(worker_id = %event.worker_id, from = ?event.from, to = ?event.to, "worker health transition");
                if let Ok(mut worker) = grid_storage::WorkerStore::get(state.store.as_ref(), &event.worker_id).await {
                    worker.status = event.to;
                    let _ = grid_storage::WorkerStore::put(state.store.as_ref(), worker).await;
                }
            }
        }
    });
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = env::state_dir().join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "gridd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    guard
}
