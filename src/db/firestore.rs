// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed key-value store.
//!
//! Each key is one document in the `kv_store` collection, holding the value
//! as a single string field.

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Collection holding one document per store key.
pub const KV_COLLECTION: &str = "kv_store";

/// Firestore caps a document at 1 MiB. Leave room for the document name
/// and field overhead.
pub const MAX_VALUE_LEN: usize = 1024 * 1024 - 4 * 1024;

/// Document shape for a stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KvDocument {
    value: String,
}

/// Firestore key-value store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation fails with
    /// [`StoreError::Unavailable`], which makes it a ready-made failing store
    /// for tests.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("Firestore not connected (offline mode)".into()))
    }

    /// Document IDs may not contain `/`, so keys are percent-encoded.
    fn document_id(key: &str) -> String {
        urlencoding::encode(key).into_owned()
    }
}

#[async_trait]
impl KeyValueStore for FirestoreStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let doc: Option<KvDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(KV_COLLECTION)
            .obj()
            .one(&Self::document_id(key))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(doc.map(|d| d.value))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if value.len() > MAX_VALUE_LEN {
            return Err(StoreError::TooLarge {
                len: value.len(),
                limit: MAX_VALUE_LEN,
            });
        }

        let doc = KvDocument {
            value: value.to_string(),
        };
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(KV_COLLECTION)
            .document_id(Self::document_id(key))
            .object(&doc)
            .execute()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<(), StoreError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(KV_COLLECTION)
            .document_id(Self::document_id(key))
            .execute()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_escapes_slashes() {
        assert_eq!(FirestoreStore::document_id("user_profile"), "user_profile");
        assert_eq!(FirestoreStore::document_id("a/b"), "a%2Fb");
    }

    #[tokio::test]
    async fn test_mock_client_fails_every_call() {
        let store = FirestoreStore::new_mock();
        assert!(matches!(
            store.get_item("k").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.set_item("k", "v").await.is_err());
        assert!(store.delete_item("k").await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_value_rejected_before_sending() {
        let store = FirestoreStore::new_mock();
        let value = "A".repeat(MAX_VALUE_LEN + 1);
        assert!(matches!(
            store.set_item("k", &value).await,
            Err(StoreError::TooLarge { limit: MAX_VALUE_LEN, .. })
        ));
    }
}
