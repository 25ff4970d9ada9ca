// tests/integration/session_test.rs

//! End-to-end tests over real WebSocket connections.

use super::fixtures::{ADMIN_PASSWORD, WRONG_PASSWORD, sample_dataset};
use super::test_helpers::{TestServer, test_config};
use rpserver::core::protocol::UNKNOWN_CMD_JSON;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;

#[tokio::test]
async fn test_request_response_over_websocket() {
    let server = TestServer::new(sample_dataset()).await;
    let mut client = server.connect().await;

    let time = client.request(r#"{"cmd":"get_time"}"#).await;
    assert_eq!(time["res"], "get_time");
    assert_eq!(time["err"], 0);
    assert!(time["time"].is_string());

    let login = client
        .request(&json!({"cmd": "login", "people_password": ADMIN_PASSWORD}).to_string())
        .await;
    assert_eq!(login["err"], 0);
    assert_eq!(login["people_name"], "Administrator");

    let rejected = client
        .request_raw(&json!({"cmd": "login", "people_password": WRONG_PASSWORD}).to_string())
        .await;
    assert_eq!(rejected, r#"{"res":"login","err":2}"#);

    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let server = TestServer::new(sample_dataset()).await;
    let mut client = server.connect().await;

    assert_eq!(client.request_raw("not json").await, UNKNOWN_CMD_JSON);
    assert_eq!(client.request_raw(r#"{"cmd":"shutdown"}"#).await, UNKNOWN_CMD_JSON);

    let tables = client.request(r#"{"cmd":"get_tables"}"#).await;
    assert_eq!(tables["res"], "get_tables");
    assert_eq!(tables["tables"].as_array().unwrap().len(), 2);

    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_binary_frame_gets_fallback() {
    let server = TestServer::new(sample_dataset()).await;
    let mut client = server.connect().await;

    let reply = client.send_binary(br#"{"cmd":"get_time"}"#.to_vec()).await;
    assert_eq!(reply, json!({"res": "unknown_cmd", "err": 1}));

    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_responses_arrive_in_request_order() {
    let server = TestServer::new(sample_dataset()).await;
    let mut client = server.connect().await;

    for cmd in ["get_peoples", "get_items_groups", "get_items", "get_tables", "get_table_busy"] {
        let reply = client.request(&json!({ "cmd": cmd }).to_string()).await;
        assert_eq!(reply["res"], cmd);
        assert_eq!(reply["err"], 0);
    }

    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_legacy_response_names() {
    let mut config = test_config();
    config.compat.legacy_response_names = true;
    let server = TestServer::with_config(config, sample_dataset()).await;
    let mut client = server.connect().await;

    let groups = client.request(r#"{"cmd":"get_items_groups"}"#).await;
    assert_eq!(groups["res"], "get_peoples");
    assert_eq!(groups["groups"].as_array().unwrap().len(), 2);

    let items = client.request(r#"{"cmd":"get_items"}"#).await;
    assert_eq!(items["res"], "get_peoples");

    let tables = client.request(r#"{"cmd":"get_tables"}"#).await;
    assert_eq!(tables["res"], "get_tables");

    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_database_outage_is_reported_per_request() {
    let server = TestServer::new(sample_dataset()).await;
    let mut client = server.connect().await;

    server.store.set_unavailable(true);
    let failed = client.request_raw(r#"{"cmd":"get_peoples"}"#).await;
    assert_eq!(failed, r#"{"res":"get_peoples","err":3}"#);

    server.store.set_unavailable(false);
    let recovered = client.request(r#"{"cmd":"get_peoples"}"#).await;
    assert_eq!(recovered["err"], 0);

    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_sessions_are_registered_and_removed() {
    let server = TestServer::new(sample_dataset()).await;

    let first = server.connect().await;
    let mut second = server.connect().await;
    let sessions = server.wait_for_sessions(2).await;
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0], sessions[1]);

    first.close().await;
    assert_eq!(server.wait_for_sessions(1).await.len(), 1);

    // The surviving session is unaffected by the other disconnect.
    let reply = second.request(r#"{"cmd":"get_time"}"#).await;
    assert_eq!(reply["err"], 0);

    second.close().await;
    assert!(server.wait_for_sessions(0).await.is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn test_abrupt_disconnect_does_not_affect_others() {
    let server = TestServer::new(sample_dataset()).await;
    let mut survivor = server.connect().await;
    let dropped = server.connect().await;
    server.wait_for_sessions(2).await;

    // Dropping the stream closes the TCP connection without a Close frame.
    drop(dropped);
    assert_eq!(server.wait_for_sessions(1).await.len(), 1);

    let reply = survivor.request(r#"{"cmd":"get_tables"}"#).await;
    assert_eq!(reply["err"], 0);

    survivor.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_max_clients_rejects_extra_connections() {
    let mut config = test_config();
    config.max_clients = 1;
    let server = TestServer::with_config(config, sample_dataset()).await;

    let mut admitted = server.connect().await;
    assert!(connect_async(server.url()).await.is_err());

    let reply = admitted.request(r#"{"cmd":"get_time"}"#).await;
    assert_eq!(reply["err"], 0);

    admitted.close().await;
    server.wait_for_sessions(0).await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_open_sessions() {
    let server = TestServer::new(sample_dataset()).await;
    let mut client = server.connect().await;
    server.wait_for_sessions(1).await;

    let shutdown = tokio::spawn(server.shutdown());
    client.expect_closed().await;
    shutdown.await.unwrap();
}

#[tokio::test]
async fn test_stalled_handshake_releases_client_slot() {
    let mut config = test_config();
    config.max_clients = 1;
    config.handshake_timeout_secs = 1;
    let server = TestServer::with_config(config, sample_dataset()).await;

    // A peer that opens TCP but never sends the upgrade request.
    let stalled = TcpStream::connect(server.handle.local_addr()).await.unwrap();
    assert!(connect_async(server.url()).await.is_err());
    assert!(server.wait_for_sessions(0).await.is_empty());

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let mut client = server.connect().await;
    let reply = client.request(r#"{"cmd":"get_time"}"#).await;
    assert_eq!(reply["err"], 0);

    drop(stalled);
    client.close().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_oversized_message_closes_connection() {
    let mut config = test_config();
    config.max_message_size = 1024;
    let server = TestServer::with_config(config, sample_dataset()).await;

    let mut client = server.connect().await;
    let padding = "x".repeat(4096);
    client
        .send_text(json!({"cmd": "get_time", "padding": padding}).to_string())
        .await;
    client.expect_closed().await;

    // Other connections are unaffected.
    let mut other = server.connect().await;
    let reply = other.request(r#"{"cmd":"get_time"}"#).await;
    assert_eq!(reply["err"], 0);

    other.close().await;
    server.shutdown().await;
}
