// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use bulk_tracker::config::Config;
use bulk_tracker::db::{KeyValueStore, MemoryStore, StoreError};
use bulk_tracker::routes::create_router;
use bulk_tracker::services::WeightConfigStore;
use bulk_tracker::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Memory store whose reads and writes can be made to fail on demand.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_delete_of: Arc<Mutex<Option<String>>>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make deleting this one key fail.
    pub fn fail_delete_of(&self, key: &str) {
        *self.fail_delete_of.lock().unwrap() = Some(key.to_string());
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated read failure".to_string()));
        }
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }
        self.inner.set_item(key, value).await
    }

    async fn delete_item(&self, key: &str) -> Result<(), StoreError> {
        let fail_key = self.fail_delete_of.lock().unwrap().as_deref() == Some(key);
        if fail_key || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }
        self.inner.delete_item(key).await
    }
}

/// Weight config store over a fresh in-memory store.
#[allow(dead_code)]
pub fn memory_weight_store() -> (WeightConfigStore, MemoryStore) {
    let store = MemoryStore::new();
    (WeightConfigStore::new(Arc::new(store.clone())), store)
}

/// Create a test app over the given store.
#[allow(dead_code)]
pub fn create_test_app_with_store(store: Arc<dyn KeyValueStore>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        weight_config: WeightConfigStore::new(store),
    });
    (create_router(state.clone()), state)
}

/// Create a test app over an empty in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(Arc::new(MemoryStore::new()))
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a body-less request.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
