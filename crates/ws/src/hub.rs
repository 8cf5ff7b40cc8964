// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket Hub (spec §4.6, component C6): a connection pool partitioned by
//! `execution_id`, server-driven heartbeats, and bounded per-execution
//! fan-out. This module holds the pure registration/quota/fan-out/heartbeat
//! logic; `server` wires it to an `axum` WebSocket upgrade.
//!
//! The hub only ever hands out serialized JSON strings on a connection's
//! channel — the socket-framing library (axum vs tokio-tungstenite) wraps
//! that string in its own `Message` type at the edge.

use crate::error::HubError;
use grid_wire::ws::{CloseCode, ConnectedConfig, WsMessage};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
    pub max_missed_pongs: u32,
    pub quota_per_execution: usize,
    pub global_quota: usize,
    pub max_queue_size: usize,
    pub batch_size: usize,
    pub send_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(20),
            pong_timeout: Duration::from_secs(10),
            max_missed_pongs: 3,
            quota_per_execution: 10,
            global_quota: 10_000,
            max_queue_size: 1_000,
            batch_size: 50,
            send_timeout: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

struct Connection {
    id: String,
    sender: mpsc::Sender<String>,
    missed_pongs: u32,
    last_pong: Instant,
}

#[derive(Default)]
struct ExecutionRoom {
    connections: Vec<Connection>,
    queue: VecDeque<WsMessage>,
    dropped: u64,
}

/// A connection evicted or closed, paired with the close code to send on
/// its socket.
pub struct ClosedConnection {
    pub execution_id: String,
    pub connection_id: String,
    pub close_code: CloseCode,
}

pub struct Hub {
    config: HubConfig,
    rooms: Mutex<HashMap<String, ExecutionRoom>>,
    total_connections: AtomicUsize,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        Self { config, rooms: Mutex::new(HashMap::new()), total_connections: AtomicUsize::new(0) }
    }

    /// Register a new connection for `execution_id`. Enforces
    /// `global_quota` (refused outright) and `quota_per_execution` (oldest
    /// connection evicted) per spec §4.6. Returns the new connection's
    /// channel and the id of any connection evicted to make room.
    pub fn register(
        &self,
        execution_id: &str,
        now_ms: u64,
    ) -> Result<(String, mpsc::Receiver<String>, Option<ClosedConnection>), HubError> {
        if self.total_connections.load(Ordering::SeqCst) >= self.config.global_quota {
            return Err(HubError::GlobalQuotaExceeded);
        }

        let connection_id = nanoid::nanoid!(21);
        let (tx, rx) = mpsc::channel(self.config.max_queue_size);

        let mut rooms = self.rooms.lock();
        let room = rooms.entry(execution_id.to_string()).or_default();

        let evicted = if room.connections.len() >= self.config.quota_per_execution {
            let old = room.connections.remove(0);
            self.total_connections.fetch_sub(1, Ordering::SeqCst);
            Some(ClosedConnection {
                execution_id: execution_id.to_string(),
                connection_id: old.id,
                close_code: CloseCode::Replaced,
            })
        } else {
            None
        };

        room.connections.push(Connection {
            id: connection_id.clone(),
            sender: tx.clone(),
            missed_pongs: 0,
            last_pong: Instant::now(),
        });
        self.total_connections.fetch_add(1, Ordering::SeqCst);

        let connected = WsMessage::Connected {
            connection_id: connection_id.clone(),
            execution_id: execution_id.to_string(),
            timestamp: now_ms,
            config: ConnectedConfig {
                ping_interval: self.config.ping_interval.as_secs(),
                pong_timeout: self.config.pong_timeout.as_secs(),
            },
        };
        if let Ok(json) = serde_json::to_string(&connected) {
            let _ = tx.try_send(json);
        }

        Ok((connection_id, rx, evicted))
    }

    pub fn unregister(&self, execution_id: &str, connection_id: &str) {
        let mut rooms = self.rooms.lock();
        if let Some(room) = rooms.get_mut(execution_id) {
            let before = room.connections.len();
            room.connections.retain(|c| c.id != connection_id);
            if room.connections.len() < before {
                self.total_connections.fetch_sub(1, Ordering::SeqCst);
            }
            if room.connections.is_empty() && room.queue.is_empty() {
                rooms.remove(execution_id);
            }
        }
    }

    /// Enqueue a message for fan-out (spec §4.6 "Message fan-out path").
    /// Drops the oldest queued message and increments a counter on overflow.
    pub fn publish(&self, execution_id: &str, message: WsMessage) {
        let mut rooms = self.rooms.lock();
        let room = rooms.entry(execution_id.to_string()).or_default();
        if room.queue.len() >= self.config.max_queue_size {
            room.queue.pop_front();
            room.dropped += 1;
        }
        room.queue.push_back(message);
    }

    pub fn dropped_count(&self, execution_id: &str) -> u64 {
        self.rooms.lock().get(execution_id).map(|r| r.dropped).unwrap_or(0)
    }

    /// Drain up to `batch_size` queued messages for one execution, serialize
    /// each once, and fan out concurrently to every subscribed connection.
    /// Any connection whose send fails is dropped from the room and
    /// returned for the caller to close (spec §4.6).
    pub async fn drain_batch(&self, execution_id: &str) -> Vec<ClosedConnection> {
        let (batch, senders) = {
            let mut rooms = self.rooms.lock();
            let Some(room) = rooms.get_mut(execution_id) else {
                return Vec::new();
            };
            let take = self.config.batch_size.min(room.queue.len());
            let batch: Vec<WsMessage> = room.queue.drain(..take).collect();
            let senders: Vec<(String, mpsc::Sender<String>)> =
                room.connections.iter().map(|c| (c.id.clone(), c.sender.clone())).collect();
            (batch, senders)
        };
        if batch.is_empty() || senders.is_empty() {
            return Vec::new();
        }

        let mut payloads = Vec::with_capacity(batch.len());
        for message in &batch {
            if let Ok(json) = serde_json::to_string(message) {
                payloads.push(json);
            }
        }

        let send_timeout = self.config.send_timeout;
        let sends = senders.into_iter().map(|(connection_id, sender)| {
            let payloads = payloads.clone();
            async move {
                for payload in payloads {
                    let send = tokio::time::timeout(send_timeout, sender.send(payload)).await;
                    if send.is_err() || send.unwrap().is_err() {
                        return Some(connection_id);
                    }
                }
                None
            }
        });
        let failed: Vec<String> = futures::future::join_all(sends).await.into_iter().flatten().collect();

        let mut closed = Vec::new();
        if !failed.is_empty() {
            let mut rooms = self.rooms.lock();
            if let Some(room) = rooms.get_mut(execution_id) {
                room.connections.retain(|c| !failed.contains(&c.id));
            }
            self.total_connections.fetch_sub(failed.len(), Ordering::SeqCst);
            for connection_id in failed {
                closed.push(ClosedConnection {
                    execution_id: execution_id.to_string(),
                    connection_id,
                    close_code: CloseCode::HeartbeatTimeout,
                });
            }
        }
        closed
    }

    pub fn record_pong(&self, execution_id: &str, connection_id: &str) {
        let mut rooms = self.rooms.lock();
        if let Some(room) = rooms.get_mut(execution_id) {
            if let Some(conn) = room.connections.iter_mut().find(|c| c.id == connection_id) {
                conn.missed_pongs = 0;
                conn.last_pong = Instant::now();
            }
        }
    }

    /// Send a ping to every connection and increment its missed-pong
    /// counter; a connection exceeding `max_missed_pongs` is removed and
    /// returned for the caller to close with code `4008` (spec §4.6).
    pub fn sweep_heartbeats(&self, now_ms: u64) -> Vec<ClosedConnection> {
        let ping = WsMessage::Ping { timestamp: now_ms };
        let Ok(json) = serde_json::to_string(&ping) else {
            return Vec::new();
        };

        let mut timed_out = Vec::new();
        let mut rooms = self.rooms.lock();
        for (execution_id, room) in rooms.iter_mut() {
            let mut still_alive = Vec::with_capacity(room.connections.len());
            for mut conn in room.connections.drain(..) {
                conn.missed_pongs += 1;
                if conn.missed_pongs > self.config.max_missed_pongs {
                    timed_out.push(ClosedConnection {
                        execution_id: execution_id.clone(),
                        connection_id: conn.id,
                        close_code: CloseCode::HeartbeatTimeout,
                    });
                    continue;
                }
                let _ = conn.sender.try_send(json.clone());
                still_alive.push(conn);
            }
            room.connections = still_alive;
        }
        self.total_connections.fetch_sub(timed_out.len(), Ordering::SeqCst);
        timed_out
    }

    /// Close every connection with code `1001` (spec §4.6 "Cancellation").
    pub fn shutdown(&self) -> Vec<ClosedConnection> {
        let mut rooms = self.rooms.lock();
        let mut closed = Vec::new();
        for (execution_id, room) in rooms.drain() {
            for conn in room.connections {
                closed.push(ClosedConnection {
                    execution_id: execution_id.clone(),
                    connection_id: conn.id,
                    close_code: CloseCode::ServerShutdown,
                });
            }
        }
        self.total_connections.store(0, Ordering::SeqCst);
        closed
    }

    pub fn connection_count(&self, execution_id: &str) -> usize {
        self.rooms.lock().get(execution_id).map(|r| r.connections.len()).unwrap_or(0)
    }

    pub fn total_connections(&self) -> usize {
        self.total_connections.load(Ordering::SeqCst)
    }
}

pub type SharedHub = Arc<Hub>;

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
