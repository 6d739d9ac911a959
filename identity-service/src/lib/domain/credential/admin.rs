use std::sync::Arc;

use auth::PasswordHasher;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::credential::errors::AdminError;
use crate::credential::models::CredentialRecord;
use crate::credential::models::EmailAddress;
use crate::credential::ports::CredentialStore;

/// Password length policy applied when the deployment does not configure one.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Privileged credential-lifecycle operations.
///
/// Create, remove and password-update live here rather than on the public
/// authentication surface; callers are expected to be operator tooling or
/// bootstrap code. Lifecycle: a credential goes NonExistent -> Active via
/// `create`, stays Active through `update_password`, and is gone after
/// `remove` until a new `create`.
pub struct AuthenticationAdminService<CS>
where
    CS: CredentialStore,
{
    credential_store: Arc<CS>,
    password_hasher: PasswordHasher,
    min_password_length: usize,
}

impl<CS> AuthenticationAdminService<CS>
where
    CS: CredentialStore,
{
    /// Create a new admin service with injected dependencies.
    ///
    /// # Arguments
    /// * `credential_store` - Credential persistence implementation
    /// * `min_password_length` - Minimum accepted password length
    pub fn new(credential_store: Arc<CS>, min_password_length: usize) -> Self {
        Self {
            credential_store,
            password_hasher: PasswordHasher::new(),
            min_password_length,
        }
    }

    /// Create a credential for a new user.
    ///
    /// # Arguments
    /// * `email` - Unique email the credential is keyed by
    /// * `password` - Plaintext password; only salt and hash are persisted
    /// * `identity` - Opaque subject id tokens will assert for this user
    ///
    /// # Errors
    /// * `PasswordTooShort` - Password below the length policy
    /// * `InvalidEmail` - Malformed email
    /// * `AlreadyExists` - A credential for this email exists
    /// * `Password`, `Store` - Backend failures
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        identity: &str,
    ) -> Result<(), AdminError> {
        self.check_password_policy(password)?;
        let email = EmailAddress::new(email.to_string())?;

        if self.credential_store.get(&email).await?.is_some() {
            return Err(AdminError::AlreadyExists(email.to_string()));
        }

        let salt = self.password_hasher.generate_salt();
        let password_hash = self.password_hasher.hash(password.as_bytes(), &salt)?;

        self.credential_store
            .set(CredentialRecord {
                email,
                password_hash,
                salt: BASE64.encode(salt),
                identity: identity.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Remove a credential.
    ///
    /// # Errors
    /// * `InvalidEmail` - Malformed email
    /// * `NotFound` - No credential for this email
    /// * `Store` - Backend failure
    pub async fn remove(&self, email: &str) -> Result<(), AdminError> {
        let email = EmailAddress::new(email.to_string())?;

        if self.credential_store.get(&email).await?.is_none() {
            return Err(AdminError::NotFound(email.to_string()));
        }

        self.credential_store.remove(&email).await?;
        Ok(())
    }

    /// Change a credential's password.
    ///
    /// When `current_password` is supplied it must match the stored
    /// credential. The new password is always salted with fresh random
    /// bytes; the old salt never carries over, even when the new password
    /// equals the old one.
    ///
    /// # Errors
    /// * `PasswordTooShort` - New password below the length policy
    /// * `InvalidEmail` - Malformed email
    /// * `NotFound` - No credential for this email
    /// * `PasswordMismatch` - Supplied current password does not match
    /// * `Password`, `Store`, `CorruptSalt` - Backend failures
    pub async fn update_password(
        &self,
        email: &str,
        new_password: &str,
        current_password: Option<&str>,
    ) -> Result<(), AdminError> {
        self.check_password_policy(new_password)?;
        let email = EmailAddress::new(email.to_string())?;

        let record = self
            .credential_store
            .get(&email)
            .await?
            .ok_or_else(|| AdminError::NotFound(email.to_string()))?;

        if let Some(current_password) = current_password {
            let stored_salt = BASE64
                .decode(&record.salt)
                .map_err(|e| AdminError::CorruptSalt(e.to_string()))?;
            let matches = self.password_hasher.verify(
                current_password.as_bytes(),
                &stored_salt,
                &record.password_hash,
            )?;
            if !matches {
                return Err(AdminError::PasswordMismatch);
            }
        }

        let salt = self.password_hasher.generate_salt();
        let password_hash = self.password_hasher.hash(new_password.as_bytes(), &salt)?;

        self.credential_store
            .set(CredentialRecord {
                email,
                password_hash,
                salt: BASE64.encode(salt),
                identity: record.identity,
            })
            .await?;
        Ok(())
    }

    fn check_password_policy(&self, password: &str) -> Result<(), AdminError> {
        if password.len() < self.min_password_length {
            return Err(AdminError::PasswordTooShort {
                min: self.min_password_length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::repositories::credential::InMemoryCredentialStore;

    const EMAIL: &str = "a@b.com";
    const PASSWORD: &str = "Secret123!";
    const IDENTITY: &str = "did:x:1";

    fn admin(store: &Arc<InMemoryCredentialStore>) -> AuthenticationAdminService<InMemoryCredentialStore> {
        AuthenticationAdminService::new(Arc::clone(store), DEFAULT_MIN_PASSWORD_LENGTH)
    }

    async fn stored(store: &InMemoryCredentialStore) -> CredentialRecord {
        let email = EmailAddress::new(EMAIL.to_string()).expect("email");
        store
            .get(&email)
            .await
            .expect("get")
            .expect("record exists")
    }

    #[tokio::test]
    async fn test_create_persists_salt_and_hash_only() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        admin.create(EMAIL, PASSWORD, IDENTITY).await.expect("create");

        let record = stored(&store).await;
        assert_eq!(record.identity, IDENTITY);
        assert!(!record.salt.is_empty());
        assert!(!record.password_hash.is_empty());
        assert_ne!(record.password_hash, PASSWORD);
    }

    #[tokio::test]
    async fn test_create_rejects_short_password() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        let result = admin.create(EMAIL, "short", IDENTITY).await;
        assert!(matches!(
            result,
            Err(AdminError::PasswordTooShort { min: 8 })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        admin.create(EMAIL, PASSWORD, IDENTITY).await.expect("create");
        let result = admin.create(EMAIL, "OtherPass1!", "did:x:2").await;

        assert!(matches!(result, Err(AdminError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_remove_unknown_email() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        let result = admin.remove(EMAIL).await;
        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_then_recreate() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        admin.create(EMAIL, PASSWORD, IDENTITY).await.expect("create");
        admin.remove(EMAIL).await.expect("remove");

        // Removed is terminal until a new create.
        let email = EmailAddress::new(EMAIL.to_string()).expect("email");
        assert!(store.get(&email).await.expect("get").is_none());

        admin
            .create(EMAIL, PASSWORD, IDENTITY)
            .await
            .expect("recreate");
    }

    #[tokio::test]
    async fn test_update_password_unknown_email() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        let result = admin.update_password(EMAIL, "NewSecret1!", None).await;
        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_password_rotates_salt_even_for_same_password() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        admin.create(EMAIL, PASSWORD, IDENTITY).await.expect("create");
        let before = stored(&store).await;

        admin
            .update_password(EMAIL, PASSWORD, None)
            .await
            .expect("update");
        let after = stored(&store).await;

        assert_ne!(before.salt, after.salt);
        assert_eq!(after.identity, IDENTITY);
    }

    #[tokio::test]
    async fn test_update_password_checks_current_password() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        admin.create(EMAIL, PASSWORD, IDENTITY).await.expect("create");

        let result = admin
            .update_password(EMAIL, "NewSecret1!", Some("wrongpassword"))
            .await;
        assert!(matches!(result, Err(AdminError::PasswordMismatch)));

        admin
            .update_password(EMAIL, "NewSecret1!", Some(PASSWORD))
            .await
            .expect("update with correct current password");
    }

    #[tokio::test]
    async fn test_update_password_rejects_short_password() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let admin = admin(&store);

        admin.create(EMAIL, PASSWORD, IDENTITY).await.expect("create");

        let result = admin.update_password(EMAIL, "short", None).await;
        assert!(matches!(result, Err(AdminError::PasswordTooShort { .. })));
    }
}
