use thiserror::Error;

use crate::keystore::KeyStoreError;

/// Error type for token operations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("No token supplied")]
    Missing,

    #[error("Token is expired")]
    Expired,

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Key store error: {0}")]
    KeyStore(#[from] KeyStoreError),
}
