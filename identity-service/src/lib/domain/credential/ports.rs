use async_trait::async_trait;

use crate::credential::errors::CredentialStoreError;
use crate::credential::models::CredentialRecord;
use crate::credential::models::EmailAddress;

/// Keyed persistence of credential records.
///
/// One record per email. The store is the serialization point for concurrent
/// requests; implementations must be safe for concurrent access.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve a credential record by email.
    ///
    /// # Returns
    /// Optional record (None if not found)
    ///
    /// # Errors
    /// * `Backend` - The backing store failed
    async fn get(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;

    /// Persist a credential record, replacing any record under the same
    /// email.
    ///
    /// # Errors
    /// * `Backend` - The backing store failed
    async fn set(&self, record: CredentialRecord) -> Result<(), CredentialStoreError>;

    /// Delete the record under the given email, if any.
    ///
    /// # Errors
    /// * `Backend` - The backing store failed
    async fn remove(&self, email: &EmailAddress) -> Result<(), CredentialStoreError>;
}

/// Extension point for revoking tokens at logout.
///
/// The base design keeps tokens stateless, so revocation defaults to a no-op
/// via [`NoRevocation`]; deployments that maintain a denylist inject their
/// own implementation.
#[async_trait]
pub trait TokenRevocation: Send + Sync + 'static {
    /// Revoke a token.
    ///
    /// # Errors
    /// * `Backend` - The revocation list failed
    async fn revoke(&self, token: &str) -> Result<(), CredentialStoreError>;
}

/// Revocation hook that does nothing.
pub struct NoRevocation;

#[async_trait]
impl TokenRevocation for NoRevocation {
    async fn revoke(&self, _token: &str) -> Result<(), CredentialStoreError> {
        Ok(())
    }
}
