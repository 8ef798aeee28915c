//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use lofy_client::api::ApiClient;
use lofy_client::config::{store_token, ApiConfig, Config, SecureString};
use lofy_client::storage::{KeyValueStore, MemoryStorage};
use lofy_client::Lofy;
use std::net::TcpListener;
use std::sync::Arc;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

pub fn api_config(base_url: &str, timeout_ms: u64) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_ms,
    }
}

pub fn memory_storage() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStorage::new())
}

/// Client against `base_url` with a fresh in-memory store.
pub fn api_client(base_url: &str, timeout_ms: u64) -> (ApiClient, Arc<dyn KeyValueStore>) {
    let storage = memory_storage();
    let client = ApiClient::new(&api_config(base_url, timeout_ms), storage.clone())
        .expect("Failed to build client");
    (client, storage)
}

/// Client handle with a stored bearer token.
pub fn logged_in_app(base_url: &str) -> (Lofy, Arc<dyn KeyValueStore>) {
    let storage = memory_storage();
    store_token(storage.as_ref(), &SecureString::new("test-token".to_string()))
        .expect("Failed to store token");
    let config = Config {
        api: api_config(base_url, 2_000),
        ..Config::default()
    };
    let app = Lofy::with_storage(config, storage.clone()).expect("Failed to build app");
    (app, storage)
}

pub fn notification_json(id: i64, title: &str, is_read: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "noti_message": format!("message {}", id),
        "time_created": "2025-11-01T08:00:00Z",
        "is_read": is_read,
        "post_id": null,
        "usr_id": 7,
        "link_to_newpost": null
    })
}
