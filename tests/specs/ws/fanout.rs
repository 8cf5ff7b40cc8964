// Scenario E (spec §8) — WebSocket fan-out with a slow subscriber: the hub
// keeps delivering to healthy subscribers and evicts the one that never
// reads, without dropping messages for anyone else.

use grid_wire::ws::WsMessage;
use grid_ws::{ClosedConnection, Hub, HubConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn slow_subscriber_is_closed_without_affecting_the_rest() {
    let config = HubConfig {
        max_queue_size: 3,
        batch_size: 10,
        send_timeout: Duration::from_millis(30),
        ..HubConfig::default()
    };
    let hub = Arc::new(Hub::new(config));
    let execution_id = "exec-scenario-e";

    let mut slow_connection_id = String::new();
    for i in 0..10 {
        let (connection_id, mut rx, _evicted) = hub.register(execution_id, 0).unwrap();
        if i == 4 {
            slow_connection_id = connection_id;
            continue; // subscriber #5 never reads its channel
        }
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
    }

    tokio::task::yield_now().await;

    let mut closed: Vec<ClosedConnection> = Vec::new();
    for i in 0..20u64 {
        hub.publish(execution_id, WsMessage::Ping { timestamp: i });
        closed.extend(hub.drain_batch(execution_id).await);
    }

    assert_eq!(closed.len(), 1, "exactly the slow subscriber should be evicted");
    assert_eq!(closed[0].connection_id, slow_connection_id);
    assert_eq!(hub.dropped_count(execution_id), 0, "healthy subscribers must not see dropped messages");
}
