// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn small_config() -> HubConfig {
    HubConfig {
        quota_per_execution: 2,
        global_quota: 3,
        max_queue_size: 2,
        batch_size: 10,
        max_missed_pongs: 2,
        ..HubConfig::default()
    }
}

#[tokio::test]
async fn register_sends_a_connected_message() {
    let hub = Hub::new(HubConfig::default());
    let (_id, mut rx, evicted) = hub.register("exec-1", 1000).unwrap();
    assert!(evicted.is_none());
    let msg = rx.recv().await.unwrap();
    assert!(msg.contains("\"type\":\"connected\""));
}

#[tokio::test]
async fn per_execution_quota_evicts_oldest_connection() {
    let hub = Hub::new(small_config());
    let (first_id, _rx1, _) = hub.register("exec-1", 0).unwrap();
    let (_second_id, _rx2, _) = hub.register("exec-1", 0).unwrap();
    let (_third_id, _rx3, evicted) = hub.register("exec-1", 0).unwrap();

    let evicted = evicted.expect("third registration should evict the first connection");
    assert_eq!(evicted.connection_id, first_id);
    assert_eq!(evicted.close_code, CloseCode::Replaced);
    assert_eq!(hub.connection_count("exec-1"), 2);
}

#[test]
fn global_quota_refuses_registration_outright() {
    let hub = Hub::new(small_config());
    let _a = hub.register("exec-1", 0).unwrap();
    let _b = hub.register("exec-2", 0).unwrap();
    let _c = hub.register("exec-3", 0).unwrap();

    let result = hub.register("exec-4", 0);
    assert!(matches!(result, Err(HubError::GlobalQuotaExceeded)));
}

#[test]
fn publish_drops_oldest_message_on_queue_overflow() {
    let hub = Hub::new(small_config());
    hub.publish("exec-1", WsMessage::Ping { timestamp: 1 });
    hub.publish("exec-1", WsMessage::Ping { timestamp: 2 });
    hub.publish("exec-1", WsMessage::Ping { timestamp: 3 });

    assert_eq!(hub.dropped_count("exec-1"), 1);
}

#[tokio::test]
async fn drain_batch_fans_out_to_every_connection() {
    let hub = Hub::new(HubConfig::default());
    let (_id1, mut rx1, _) = hub.register("exec-1", 0).unwrap();
    let (_id2, mut rx2, _) = hub.register("exec-1", 0).unwrap();
    let _ = rx1.recv().await.unwrap();
    let _ = rx2.recv().await.unwrap();

    hub.publish("exec-1", WsMessage::Ping { timestamp: 42 });
    let closed = hub.drain_batch("exec-1").await;
    assert!(closed.is_empty());

    let m1 = rx1.recv().await.unwrap();
    let m2 = rx2.recv().await.unwrap();
    assert!(m1.contains("42"));
    assert!(m2.contains("42"));
}

#[test]
fn sweep_heartbeats_closes_connections_exceeding_missed_pongs() {
    let hub = Hub::new(small_config());
    let (id, _rx, _) = hub.register("exec-1", 0).unwrap();

    assert!(hub.sweep_heartbeats(1).is_empty());
    assert!(hub.sweep_heartbeats(2).is_empty());
    let closed = hub.sweep_heartbeats(3);

    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].connection_id, id);
    assert_eq!(closed[0].close_code, CloseCode::HeartbeatTimeout);
    assert_eq!(hub.connection_count("exec-1"), 0);
}

#[test]
fn record_pong_resets_missed_pong_counter() {
    let hub = Hub::new(small_config());
    let (id, _rx, _) = hub.register("exec-1", 0).unwrap();

    let _ = hub.sweep_heartbeats(1);
    hub.record_pong("exec-1", &id);
    let _ = hub.sweep_heartbeats(2);
    let closed = hub.sweep_heartbeats(3);

    assert!(closed.is_empty());
}

#[test]
fn unregister_removes_the_connection_and_frees_global_quota() {
    let hub = Hub::new(small_config());
    let (id, _rx, _) = hub.register("exec-1", 0).unwrap();
    assert_eq!(hub.total_connections(), 1);

    hub.unregister("exec-1", &id);
    assert_eq!(hub.total_connections(), 0);
    assert_eq!(hub.connection_count("exec-1"), 0);
}

#[test]
fn shutdown_closes_every_connection_with_server_shutdown_code() {
    let hub = Hub::new(HubConfig::default());
    let (id_a, _rx_a, _) = hub.register("exec-1", 0).unwrap();
    let (id_b, _rx_b, _) = hub.register("exec-2", 0).unwrap();

    let mut closed = hub.shutdown();
    closed.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
    let mut expected_ids = vec![id_a, id_b];
    expected_ids.sort();

    assert_eq!(closed.len(), 2);
    assert_eq!(closed[0].connection_id, expected_ids[0]);
    assert_eq!(closed[1].connection_id, expected_ids[1]);
    assert!(closed.iter().all(|c| c.close_code == CloseCode::ServerShutdown));
    assert_eq!(hub.total_connections(), 0);
}
