use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::errors::PasswordError;

/// Salt length in bytes for newly created credentials.
pub const SALT_LENGTH: usize = 16;

const HASH_LENGTH: usize = 32;

/// Password hashing implementation.
///
/// Derives a fixed-length Argon2id digest from a password and an explicitly
/// supplied salt, so the salt can be stored next to the hash and the same
/// derivation repeated at verification time. The digest is encoded as
/// standard base64.
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Generate a random salt for a new credential.
    ///
    /// # Returns
    /// 16 bytes from the OS random number generator
    pub fn generate_salt(&self) -> [u8; SALT_LENGTH] {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        salt
    }

    /// Hash a password with the given salt.
    ///
    /// Deterministic: hashing the same password with the same salt always
    /// produces the same output, so a re-hash of a supplied password against
    /// a stored salt can be compared byte-for-byte with the stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password bytes
    /// * `salt` - Salt bytes (at least 8 bytes)
    ///
    /// # Returns
    /// Base64-encoded Argon2id digest
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &[u8], salt: &[u8]) -> Result<String, PasswordError> {
        let mut output = [0u8; HASH_LENGTH];

        Argon2::default()
            .hash_password_into(password, salt, &mut output)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(BASE64.encode(output))
    }

    /// Verify a password against a stored salt and hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password bytes
    /// * `salt` - Salt stored with the credential
    /// * `expected_hash` - Base64 hash stored with the credential
    ///
    /// # Returns
    /// True if the re-derived hash equals the stored hash
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn verify(
        &self,
        password: &[u8],
        salt: &[u8],
        expected_hash: &str,
    ) -> Result<bool, PasswordError> {
        let computed = self.hash(password, salt)?;
        Ok(computed == expected_hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = PasswordHasher::new();
        let salt = hasher.generate_salt();

        let first = hasher.hash(b"my_secure_password", &salt).expect("hash");
        let second = hasher.hash(b"my_secure_password", &salt).expect("hash");

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_passwords_produce_different_hashes() {
        let hasher = PasswordHasher::new();
        let salt = hasher.generate_salt();

        let first = hasher.hash(b"password_one", &salt).expect("hash");
        let second = hasher.hash(b"password_two", &salt).expect("hash");

        assert_ne!(first, second);
    }

    #[test]
    fn test_different_salts_produce_different_hashes() {
        let hasher = PasswordHasher::new();
        let salt_a = hasher.generate_salt();
        let salt_b = hasher.generate_salt();

        let first = hasher.hash(b"same_password", &salt_a).expect("hash");
        let second = hasher.hash(b"same_password", &salt_b).expect("hash");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify() {
        let hasher = PasswordHasher::new();
        let salt = hasher.generate_salt();
        let hash = hasher.hash(b"my_secure_password", &salt).expect("hash");

        assert!(hasher
            .verify(b"my_secure_password", &salt, &hash)
            .expect("verify"));
        assert!(!hasher
            .verify(b"wrong_password", &salt, &hash)
            .expect("verify"));
    }
}
