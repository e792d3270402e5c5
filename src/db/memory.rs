// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store backed by a concurrent map.

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory key-value store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}
