// tests/integration/ordering_test.rs

//! Frames from all sessions are dispatched one at a time: a slow command on
//! one connection holds back every other connection until it completes.

use super::fixtures::sample_dataset;
use super::test_helpers::{TestClient, init_tracing, test_config};
use async_trait::async_trait;
use rpserver::core::errors::StoreError;
use rpserver::core::protocol::Record;
use rpserver::core::storage::{DataStore, MemoryStore};
use rpserver::server;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;

/// A store whose `get_peoples` blocks until the test releases it.
struct GatedStore {
    inner: MemoryStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl DataStore for GatedStore {
    async fn connect(&self, name: &str, user: &str, password: &str) -> Result<(), StoreError> {
        self.inner.connect(name, user, password).await
    }

    async fn get_person(&self, password: &str) -> Result<Option<Record>, StoreError> {
        self.inner.get_person(password).await
    }

    async fn get_peoples(&self) -> Result<Vec<Record>, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.get_peoples().await
    }

    async fn get_items_groups(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.get_items_groups().await
    }

    async fn get_items(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.get_items().await
    }

    async fn get_tables(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.get_tables().await
    }

    async fn get_table_busy(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.get_table_busy().await
    }
}

fn spawn_request(mut client: TestClient, text: &'static str) -> JoinHandle<Value> {
    tokio::spawn(async move {
        let reply = client.request(text).await;
        client.close().await;
        reply
    })
}

#[tokio::test]
async fn test_slow_command_blocks_other_sessions() {
    init_tracing();
    let store = Arc::new(GatedStore {
        inner: MemoryStore::new(sample_dataset()),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let handle = server::start(test_config(), store.clone())
        .await
        .expect("server should start");
    let url = format!("ws://{}", handle.local_addr());

    let (slow_ws, _) = connect_async(url.as_str()).await.unwrap();
    let (fast_ws, _) = connect_async(url.as_str()).await.unwrap();

    let slow = spawn_request(TestClient::from_stream(slow_ws), r#"{"cmd":"get_peoples"}"#);
    store.entered.notified().await;

    let fast = spawn_request(TestClient::from_stream(fast_ws), r#"{"cmd":"get_time"}"#);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!slow.is_finished());
    assert!(
        !fast.is_finished(),
        "get_time was answered while get_peoples was still running"
    );

    store.release.notify_one();
    let slow_reply = slow.await.unwrap();
    assert_eq!(slow_reply["res"], "get_peoples");
    assert_eq!(slow_reply["err"], 0);

    let fast_reply = fast.await.unwrap();
    assert_eq!(fast_reply["res"], "get_time");
    assert_eq!(fast_reply["err"], 0);

    handle.shutdown().await.unwrap();
}
