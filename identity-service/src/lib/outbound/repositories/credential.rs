use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::credential::errors::CredentialStoreError;
use crate::credential::models::CredentialRecord;
use crate::credential::models::EmailAddress;
use crate::credential::ports::CredentialStore;

/// In-memory credential store.
///
/// Keeps records in a process-local map behind an async lock; requests
/// serialize here. Suitable for single-node deployments and tests.
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let records = self.records.read().await;
        Ok(records.get(email.as_str()).cloned())
    }

    async fn set(&self, record: CredentialRecord) -> Result<(), CredentialStoreError> {
        let mut records = self.records.write().await;
        records.insert(record.email.as_str().to_string(), record);
        Ok(())
    }

    async fn remove(&self, email: &EmailAddress) -> Result<(), CredentialStoreError> {
        let mut records = self.records.write().await;
        records.remove(email.as_str());
        Ok(())
    }
}
