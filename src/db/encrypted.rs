// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encrypt-at-rest wrapper for any [`KeyValueStore`].
//!
//! Values are sealed with AES-256-GCM. The key is derived from a configured
//! secret with HKDF-SHA256, and the store key is bound in as associated data
//! so a ciphertext copied under another key fails to open.
//!
//! Stored format: `base64(nonce || ciphertext || tag)`.

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::sync::Arc;

const HKDF_SALT: &[u8] = b"bulk-tracker-store-v1";
const HKDF_INFO: &[u8] = b"store-value-encryption";

/// Store wrapper that encrypts every value before it reaches `inner`.
pub struct EncryptedStore {
    inner: Arc<dyn KeyValueStore>,
    key: LessSafeKey,
    rng: SystemRandom,
}

impl EncryptedStore {
    /// Wrap `inner`, deriving the value key from `secret`.
    pub fn new(inner: Arc<dyn KeyValueStore>, secret: &[u8]) -> Result<Self, StoreError> {
        if secret.is_empty() {
            return Err(StoreError::Crypto("Encryption secret is empty".to_string()));
        }

        let mut okm = [0u8; 32];
        Hkdf::<Sha256>::new(Some(HKDF_SALT), secret)
            .expand(HKDF_INFO, &mut okm)
            .map_err(|e| StoreError::Crypto(format!("HKDF expand failed: {}", e)))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &okm)
            .map_err(|_| StoreError::Crypto("Invalid AES key".to_string()))?;

        Ok(Self {
            inner,
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    fn seal(&self, key: &str, plaintext: &str) -> Result<String, StoreError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| StoreError::Crypto("Failed to generate nonce".to_string()))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(key.as_bytes()),
                &mut in_out,
            )
            .map_err(|_| StoreError::Crypto("Seal failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(BASE64.encode(sealed))
    }

    fn open(&self, key: &str, encoded: &str) -> Result<String, StoreError> {
        let mut sealed = BASE64
            .decode(encoded)
            .map_err(|e| StoreError::Malformed(format!("Base64 decode failed: {}", e)))?;

        if sealed.len() < NONCE_LEN {
            return Err(StoreError::Malformed("Ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at_mut(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| StoreError::Crypto("Invalid nonce".to_string()))?;

        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(key.as_bytes()), ciphertext)
            .map_err(|_| StoreError::Crypto(format!("Failed to decrypt value for {}", key)))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| StoreError::Malformed(format!("UTF-8 decode failed: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for EncryptedStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.inner.get_item(key).await? {
            Some(encoded) => self.open(key, &encoded).map(Some),
            None => Ok(None),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let sealed = self.seal(key, value)?;
        self.inner.set_item(key, &sealed).await
    }

    async fn delete_item(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete_item(key).await
    }
}
