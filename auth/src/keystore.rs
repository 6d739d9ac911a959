use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Purpose a managed key is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Signing,
    Encryption,
}

/// Key material resolved from a [`KeyStore`].
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub key_type: KeyType,
    pub secret: Vec<u8>,
}

/// Error type for key store operations.
#[derive(Debug, Clone, Error)]
pub enum KeyStoreError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Key store backend error: {0}")]
    Backend(String),
}

/// Custodian of cryptographic key material, addressed by reference.
///
/// Key references are opaque names, conventionally scoped to an operator
/// identity (`"{operator}/{key-name}"`). The token service resolves a
/// reference per sign/verify call and never holds key material itself, so
/// implementations remain free to rotate or externalize keys. Calls may be
/// issued concurrently from independent requests.
#[async_trait]
pub trait KeyStore: Send + Sync + 'static {
    /// Resolve key material by reference.
    ///
    /// # Errors
    /// * `NotFound` - No key exists under this reference
    /// * `Backend` - The backing store failed
    async fn resolve(&self, key_ref: &str) -> Result<KeyMaterial, KeyStoreError>;

    /// Create a key under the given reference with fresh random material.
    ///
    /// Idempotent: creating a reference that already exists leaves the
    /// existing material untouched.
    ///
    /// # Errors
    /// * `Backend` - The backing store failed
    async fn create_key(&self, key_ref: &str, key_type: KeyType) -> Result<(), KeyStoreError>;
}

const SECRET_LENGTH: usize = 32;

/// In-memory key store.
///
/// Keeps generated secrets in a process-local map behind an async lock.
/// Suitable for single-node deployments and tests.
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<String, KeyMaterial>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn resolve(&self, key_ref: &str) -> Result<KeyMaterial, KeyStoreError> {
        let keys = self.keys.read().await;
        keys.get(key_ref)
            .cloned()
            .ok_or_else(|| KeyStoreError::NotFound(key_ref.to_string()))
    }

    async fn create_key(&self, key_ref: &str, key_type: KeyType) -> Result<(), KeyStoreError> {
        let mut keys = self.keys.write().await;
        if keys.contains_key(key_ref) {
            return Ok(());
        }

        let mut secret = vec![0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut secret);
        keys.insert(key_ref.to_string(), KeyMaterial { key_type, secret });
        Ok(())
    }
}
