use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for credential store operations
#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    #[error("Credential store backend error: {0}")]
    Backend(String),
}

/// Why a login was refused.
///
/// Only ever surfaced as the `source` of [`AuthError::LoginFailed`]: callers
/// see one opaque failure whether the email is unknown or the password is
/// wrong, so login cannot be used to enumerate accounts. The distinction
/// stays available for logging.
#[derive(Debug, Clone, Error)]
pub enum LoginFailureReason {
    #[error("no credential for email")]
    UnknownEmail,

    #[error("password mismatch")]
    PasswordMismatch,
}

/// Error for authentication operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("login failed")]
    LoginFailed(#[source] LoginFailureReason),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("credential store error: {0}")]
    Store(#[from] CredentialStoreError),

    #[error("stored salt is corrupt: {0}")]
    CorruptSalt(String),
}

/// Error for privileged credential-lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum AdminError {
    #[error("password shorter than {min} characters")]
    PasswordTooShort { min: usize },

    #[error("credential already exists for email: {0}")]
    AlreadyExists(String),

    #[error("no credential for email: {0}")]
    NotFound(String),

    #[error("current password does not match")]
    PasswordMismatch,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("credential store error: {0}")]
    Store(#[from] CredentialStoreError),

    #[error("stored salt is corrupt: {0}")]
    CorruptSalt(String),
}
