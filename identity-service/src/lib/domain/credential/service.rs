use std::sync::Arc;

use auth::IssuedToken;
use auth::KeyStore;
use auth::PasswordHasher;
use auth::TokenError;
use auth::TokenService;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::credential::errors::AuthError;
use crate::credential::errors::LoginFailureReason;
use crate::credential::models::EmailAddress;
use crate::credential::ports::CredentialStore;
use crate::credential::ports::NoRevocation;
use crate::credential::ports::TokenRevocation;

/// Token lifetime applied when the deployment does not configure one.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Authentication use cases: login, logout, refresh.
///
/// Orchestrates the credential store, the password hasher and the token
/// service. Stateless between calls; safe to share behind an `Arc`.
pub struct AuthenticationService<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    credential_store: Arc<CS>,
    token_service: TokenService<KS>,
    revocation: Arc<dyn TokenRevocation>,
    password_hasher: PasswordHasher,
    signing_key_ref: String,
    token_ttl_minutes: i64,
}

impl<CS, KS> AuthenticationService<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `credential_store` - Credential persistence implementation
    /// * `key_store` - Key management backend tokens are signed against
    /// * `signing_key_ref` - Signing key reference, scoped to the operator
    /// * `token_ttl_minutes` - Validity window for issued tokens
    pub fn new(
        credential_store: Arc<CS>,
        key_store: Arc<KS>,
        signing_key_ref: impl Into<String>,
        token_ttl_minutes: i64,
    ) -> Self {
        Self {
            credential_store,
            token_service: TokenService::new(key_store),
            revocation: Arc::new(NoRevocation),
            password_hasher: PasswordHasher::new(),
            signing_key_ref: signing_key_ref.into(),
            token_ttl_minutes,
        }
    }

    /// Replace the logout revocation hook.
    pub fn with_revocation(mut self, revocation: Arc<dyn TokenRevocation>) -> Self {
        self.revocation = revocation;
        self
    }

    /// Authenticate an email/password pair and issue a token.
    ///
    /// The failure reason is deliberately opaque: an unknown email and a
    /// wrong password both come back as `LoginFailed`, so callers cannot
    /// probe which addresses have accounts.
    ///
    /// # Returns
    /// Freshly issued token and its expiry in Unix milliseconds
    ///
    /// # Errors
    /// * `LoginFailed` - Unknown email or password mismatch
    /// * `Token`, `Password`, `Store`, `CorruptSalt` - Backend failures
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        // Malformed addresses cannot have a record; same opaque failure.
        let email = EmailAddress::new(email.to_string())
            .map_err(|_| AuthError::LoginFailed(LoginFailureReason::UnknownEmail))?;

        let record = self
            .credential_store
            .get(&email)
            .await?
            .ok_or(AuthError::LoginFailed(LoginFailureReason::UnknownEmail))?;

        let salt = BASE64
            .decode(&record.salt)
            .map_err(|e| AuthError::CorruptSalt(e.to_string()))?;
        let matches = self
            .password_hasher
            .verify(password.as_bytes(), &salt, &record.password_hash)?;
        if !matches {
            return Err(AuthError::LoginFailed(LoginFailureReason::PasswordMismatch));
        }

        let issued = self
            .token_service
            .create_token(&self.signing_key_ref, &record.identity, self.token_ttl_minutes)
            .await?;
        Ok(issued)
    }

    /// End a session.
    ///
    /// Stateless tokens have nothing to invalidate server-side; this hands
    /// the token to the revocation hook, which is a no-op by default.
    ///
    /// # Errors
    /// * `Store` - The revocation hook failed
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        if let Some(token) = token {
            if !token.is_empty() {
                self.revocation.revoke(token).await?;
            }
        }
        Ok(())
    }

    /// Exchange a valid token for a fresh one.
    ///
    /// Verifies the supplied token and mints a brand-new token for the same
    /// subject with a full TTL window; the original password is not needed.
    ///
    /// # Errors
    /// * `Token` - Supplied token absent, invalid or expired
    pub async fn refresh(&self, token: Option<&str>) -> Result<IssuedToken, AuthError> {
        let verified = self
            .token_service
            .verify(&self.signing_key_ref, token)
            .await?;
        let subject = verified
            .claims
            .sub
            .ok_or(AuthError::Token(TokenError::MissingSubject))?;

        let issued = self
            .token_service
            .create_token(&self.signing_key_ref, &subject, self.token_ttl_minutes)
            .await?;
        Ok(issued)
    }
}
