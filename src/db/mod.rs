// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value storage layer.
//!
//! Everything the app persists goes through [`KeyValueStore`], a plain
//! string-to-string store. Backends:
//! - [`MemoryStore`] (tests, ephemeral runs)
//! - [`FileStore`] (single JSON file on disk)
//! - [`FirestoreStore`] (one document per key)
//! - [`EncryptedStore`] (AES-GCM wrapper around any of the above)

pub mod encrypted;
pub mod file;
pub mod firestore;
pub mod memory;

pub use encrypted::EncryptedStore;
pub use file::FileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::config::{Config, StoreBackend};
use async_trait::async_trait;
use std::sync::Arc;

/// Store keys as constants.
///
/// Photos get keys of their own so that no single value grows past what a
/// backend document can hold, and so profile rewrites do not copy them.
pub mod keys {
    /// The user profile blob (weights, daily progress, onboarding answers).
    pub const USER_PROFILE: &str = "user_profile";
    /// Set to `"true"` once onboarding has been completed.
    pub const ONBOARDING_COMPLETE: &str = "onboarding_complete";
    pub const PHOTO_BEFORE: &str = "photo_before";
    pub const PHOTO_AFTER: &str = "photo_after";
    /// JSON array of progress photo IDs, oldest first.
    pub const PROGRESS_PHOTO_INDEX: &str = "progress_photos";

    /// Key holding the progress photo with the given ID.
    pub fn progress_photo(id: u64) -> String {
        format!("progress_photo_{}", id)
    }
}

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` if the key is absent.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing an absent key is not an error.
    async fn delete_item(&self, key: &str) -> Result<(), StoreError>;
}

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored value: {0}")]
    Malformed(String),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Value too large: {len} bytes (limit {limit})")]
    TooLarge { len: usize, limit: usize },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

/// Open the store selected by the configuration.
///
/// When an encryption key is configured, the backend is wrapped in an
/// [`EncryptedStore`].
pub async fn connect(config: &Config) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    let backend: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File => {
            tracing::info!(path = %config.store_path.display(), "Using file store");
            Arc::new(FileStore::new(&config.store_path))
        }
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(&config.gcp_project_id).await?),
    };

    match &config.store_encryption_key {
        Some(secret) => {
            tracing::info!("Store values are encrypted at rest");
            Ok(Arc::new(EncryptedStore::new(backend, secret)?))
        }
        None => Ok(backend),
    }
}
