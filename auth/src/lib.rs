//! Authentication utilities library
//!
//! Provides the building blocks for token-based authentication:
//! - Password hashing with explicit salts (Argon2id)
//! - JWT token issuance and verification against a key store
//! - Bearer/cookie token transport extraction
//!
//! Services own their credential records and policies; this crate only knows
//! how to hash, sign, verify and locate tokens.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let salt = hasher.generate_salt();
//! let hash = hasher.hash(b"my_password", &salt).unwrap();
//! assert!(hasher.verify(b"my_password", &salt, &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//! use auth::{InMemoryKeyStore, KeyStore, KeyType, TokenService};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let key_store = Arc::new(InMemoryKeyStore::new());
//! key_store.create_key("node-1/auth-signing", KeyType::Signing).await.unwrap();
//!
//! let tokens = TokenService::new(key_store);
//! let issued = tokens.create_token("node-1/auth-signing", "did:example:1", 60).await.unwrap();
//! let verified = tokens.verify("node-1/auth-signing", Some(&issued.token)).await.unwrap();
//! assert_eq!(verified.claims.sub.as_deref(), Some("did:example:1"));
//! # });
//! ```

pub mod jwt;
pub mod keystore;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::TokenError;
pub use keystore::InMemoryKeyStore;
pub use keystore::KeyMaterial;
pub use keystore::KeyStore;
pub use keystore::KeyStoreError;
pub use keystore::KeyType;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::extract_token;
pub use token::ExtractedToken;
pub use token::IssuedToken;
pub use token::TokenLocation;
pub use token::TokenService;
pub use token::VerifiedToken;
