use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use uuid::Uuid;

use crate::jwt::Claims;
use crate::jwt::TokenError;
use crate::keystore::KeyStore;

/// A freshly issued token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,
    /// Expiry as Unix milliseconds
    pub expiry_ms: i64,
}

/// A successfully verified token, decoded.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub header: Header,
    pub claims: Claims,
}

/// Token issuance and verification against a key store.
///
/// Stateless apart from the key store handle: key material is resolved by
/// reference per call, signed/verified with HS256, and never retained.
pub struct TokenService<KS: KeyStore> {
    key_store: Arc<KS>,
    algorithm: Algorithm,
}

impl<KS: KeyStore> Clone for TokenService<KS> {
    fn clone(&self) -> Self {
        Self {
            key_store: Arc::clone(&self.key_store),
            algorithm: self.algorithm,
        }
    }
}

impl<KS: KeyStore> TokenService<KS> {
    /// Create a new token service backed by the given key store.
    pub fn new(key_store: Arc<KS>) -> Self {
        Self {
            key_store,
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a token for a subject.
    ///
    /// The expiry is `now + ttl_minutes * 60` in Unix seconds; the returned
    /// expiry is the same instant in milliseconds. Every token carries a
    /// fresh `jti`, so two tokens for the same subject never collide even
    /// when issued within the same second.
    ///
    /// # Arguments
    /// * `key_ref` - Signing key reference
    /// * `subject` - Identity the token asserts
    /// * `ttl_minutes` - Validity window in minutes
    ///
    /// # Errors
    /// * `KeyStore` - Signing key could not be resolved
    /// * `SigningFailed` - Token encoding failed
    pub async fn create_token(
        &self,
        key_ref: &str,
        subject: &str,
        ttl_minutes: i64,
    ) -> Result<IssuedToken, TokenError> {
        let key = self.key_store.resolve(key_ref).await?;

        let now = Utc::now().timestamp();
        let expiry = now + ttl_minutes * 60;
        let claims = Claims::new()
            .with_subject(subject)
            .with_expiration(expiry)
            .with_issued_at(now)
            .with_token_id(Uuid::new_v4());

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &EncodingKey::from_secret(&key.secret))
            .map_err(|e| TokenError::SigningFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expiry_ms: expiry * 1000,
        })
    }

    /// Verify a token and decode it.
    ///
    /// # Arguments
    /// * `key_ref` - Signing key reference
    /// * `token` - Encoded token, if one was supplied at all
    ///
    /// # Errors
    /// * `Missing` - Token absent or empty
    /// * `Expired` - The `exp` claim is in the past
    /// * `MissingSubject` - No `sub` claim
    /// * `Invalid` - Signature or format verification failed
    /// * `KeyStore` - Signing key could not be resolved
    pub async fn verify(
        &self,
        key_ref: &str,
        token: Option<&str>,
    ) -> Result<VerifiedToken, TokenError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(TokenError::Missing),
        };

        let key = self.key_store.resolve(key_ref).await?;

        let mut validation = Validation::new(self.algorithm);
        // The expiry check applies when `exp` is present; no claim is
        // unconditionally required so the precise failure is reported below.
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&key.secret), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        if data.claims.sub.as_deref().map_or(true, str::is_empty) {
            return Err(TokenError::MissingSubject);
        }

        Ok(VerifiedToken {
            header: data.header,
            claims: data.claims,
        })
    }
}
