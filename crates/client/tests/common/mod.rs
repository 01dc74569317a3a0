//! Shared harness for the wiremock-backed integration tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::json;
use wiremock::MockServer;

use mailcove_client::app::App;
use mailcove_client::config::ClientConfig;
use mailcove_client::router::Navigator;
use mailcove_client::storage::{MemoryStorage, StoragePort, keys};

/// Navigator that records every forced navigation.
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

pub struct Harness {
    pub server: MockServer,
    pub app: App,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(5)).await
    }

    pub async fn start_with_timeout(timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::default());

        let config = ClientConfig::new(&format!("{}/api", server.uri()))
            .expect("mock server uri is a valid base url")
            .with_timeout(timeout);
        let app = App::new(
            &config,
            storage.clone() as Arc<dyn StoragePort>,
            navigator.clone(),
            None,
        );

        Self {
            server,
            app,
            storage,
            navigator,
        }
    }

    /// Seed the persisted store as a previous session would have left it.
    pub fn seed_session(&self, token: &str) {
        self.storage.set(keys::AUTH_TOKEN, token);
        self.storage.set(
            keys::AUTH_USER,
            &identity_json("ada", "user").to_string(),
        );
    }
}

/// Identity JSON in the backend's wire shape.
pub fn identity_json(username: &str, role: &str) -> serde_json::Value {
    json!({
        "id": format!("u-{username}"),
        "username": username,
        "email": format!("{username}@example.com"),
        "role": role,
        "status": "active",
        "createdAt": "2026-01-01T00:00:00Z",
    })
}

/// Backend envelope wrapper.
pub fn envelope(code: i64, data: serde_json::Value, msg: &str) -> serde_json::Value {
    json!({ "code": code, "data": data, "msg": msg })
}
