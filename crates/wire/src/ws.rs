// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket JSON message shapes (spec §6 "WebSocket API"), shared by the
//! server (`grid-ws`) and any Rust client/tests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedConfig {
    pub ping_interval: u64,
    pub pong_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLineData {
    pub execution_id: String,
    pub log_type: String,
    pub content: String,
    pub timestamp: u64,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStatusData {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Server → client and client → server message shapes (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected {
        connection_id: String,
        execution_id: String,
        timestamp: u64,
        config: ConnectedConfig,
    },
    LogLine {
        execution_id: String,
        data: LogLineData,
        timestamp: u64,
    },
    ExecutionStatus {
        execution_id: String,
        data: ExecutionStatusData,
        timestamp: u64,
    },
    HistoricalLogsStart {
        execution_id: String,
        timestamp: u64,
    },
    HistoricalLogsEnd {
        execution_id: String,
        timestamp: u64,
    },
    NoHistoricalLogs {
        execution_id: String,
        timestamp: u64,
    },
    Ping {
        timestamp: u64,
    },
    Pong {
        timestamp: u64,
    },
}

/// WebSocket close codes used by the hub (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    Replaced,
    ServerShutdown,
    AuthFailed,
    NotFound,
    HeartbeatTimeout,
    Inactive,
}

impl CloseCode {
    pub fn as_u16(self) -> u16 {
        match self {
            CloseCode::Replaced => 1000,
            CloseCode::ServerShutdown => 1001,
            CloseCode::AuthFailed => 4003,
            CloseCode::NotFound => 4004,
            CloseCode::HeartbeatTimeout => 4008,
            CloseCode::Inactive => 4009,
        }
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
