// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Axum wiring for the hub: mounts the upgrade handler at
//! `/ws/executions/{execution_id}/logs` (spec §4.6) and drives each
//! socket's ping/pong and fan-out loop.

use crate::hub::{ClosedConnection, SharedHub};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use grid_wire::ws::WsMessage;
use std::borrow::Cow;
use std::time::Duration;

pub fn router(hub: SharedHub) -> Router {
    Router::new().route("/ws/executions/:execution_id/logs", get(upgrade)).with_state(hub)
}

async fn upgrade(
    State(hub): State<SharedHub>,
    Path(execution_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(hub, execution_id, socket))
}

async fn handle_socket(hub: SharedHub, execution_id: String, mut socket: WebSocket) {
    let now_ms = crate::now_ms();
    let (connection_id, mut rx, evicted) = match hub.register(&execution_id, now_ms) {
        Ok(parts) => parts,
        Err(_) => {
            close_with(&mut socket, CloseFrame { code: 4009, reason: Cow::Borrowed("global quota exceeded") }).await;
            return;
        }
    };

    if let Some(evicted) = evicted {
        // The evicted connection is owned by another task's socket loop and
        // will observe the closure on its own next recv; nothing to do here
        // beyond having already dropped its sender above.
        tracing::debug!(connection_id = %evicted.connection_id, "evicted for per-execution quota");
    }

    let mut heartbeat = tokio::time::interval(Duration::from_secs(20));
    heartbeat.tick().await;

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                match outgoing {
                    Some(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Pong(_))) => hub.record_pong(&execution_id, &connection_id),
                    Some(Ok(Message::Text(text))) => {
                        // Any message is liveness evidence; a text frame that
                        // parses as our own protocol (typically Pong) still
                        // goes through the same record_pong call.
                        if let Ok(parsed) = serde_json::from_str::<WsMessage>(&text) {
                            tracing::trace!(?parsed, "received client ws message");
                        }
                        hub.record_pong(&execution_id, &connection_id);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            _ = heartbeat.tick() => {
                let closed = hub.sweep_heartbeats(crate::now_ms());
                if closed.iter().any(|c: &ClosedConnection| c.connection_id == connection_id) {
                    break;
                }
            }
        }
    }

    hub.unregister(&execution_id, &connection_id);
}

async fn close_with(socket: &mut WebSocket, frame: CloseFrame<'static>) {
    let _ = socket.send(Message::Close(Some(frame))).await;
}
