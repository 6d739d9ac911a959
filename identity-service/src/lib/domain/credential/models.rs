use std::fmt;
use std::str::FromStr;

use crate::credential::errors::EmailError;

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Credential aggregate entity.
///
/// One record per email, owned exclusively by the credential store. The
/// password only survives as a salt plus hash pair; `identity` is the opaque
/// subject id (e.g. a DID) issued tokens assert.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub email: EmailAddress,
    pub password_hash: String,
    /// Base64-encoded salt the hash was derived with
    pub salt: String,
    pub identity: String,
}
