//! Shared fixtures for the handler tests: an in-memory database state and an
//! object store double that records its calls.

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;

use reelbox_db::Database;
use reelbox_storage::ObjectStore;

use crate::auth::{AppState, AppStateInner};

pub(crate) struct MockStore {
    pub deleted: Mutex<Vec<String>>,
    pub presigned_gets: Mutex<Vec<String>>,
    fail_delete: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            deleted: Mutex::new(Vec::new()),
            presigned_gets: Mutex::new(Vec::new()),
            fail_delete: false,
        }
    }

    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn presign_put(&self, key: &str, ttl_secs: u32) -> Result<String> {
        Ok(format!("http://signed.example/put/{key}?ttl={ttl_secs}"))
    }

    async fn presign_get(&self, key: &str, ttl_secs: u32) -> Result<String> {
        self.presigned_gets.lock().unwrap().push(key.to_string());
        Ok(format!("http://signed.example/get/{key}?ttl={ttl_secs}"))
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        if self.fail_delete {
            bail!("simulated store outage");
        }
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("http://store.example/bucket/{key}")
    }
}

pub(crate) fn test_state(store: Arc<MockStore>) -> AppState {
    state_with(Some(store))
}

pub(crate) fn test_state_without_store() -> AppState {
    state_with(None)
}

fn state_with(store: Option<Arc<MockStore>>) -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        store: store.map(|s| s as Arc<dyn ObjectStore>),
        jwt_secret: "test-secret".to_string(),
        admin_email: Some("admin@example.com".to_string()),
        admin_password: Some("hunter2hunter2".to_string()),
    })
}
