use std::collections::HashMap;
use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub bootstrap: Option<BootstrapUser>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Key the token service signs and verifies with
    #[serde(default = "default_signing_key_name")]
    pub signing_key_name: String,
    /// Key reserved for payload encryption features
    #[serde(default = "default_encryption_key_name")]
    pub encryption_key_name: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PartitionConfig {
    /// Operator identity key references are scoped to
    #[serde(default = "default_system_identity")]
    pub system_identity: String,
    /// Partition every request lands in when no api-key map is configured
    #[serde(default = "default_partition_id")]
    pub partition_id: String,
    /// Optional api key -> partition id map; enables multi-tenant resolution
    #[serde(default)]
    pub api_keys: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    /// Echo internal error causes to clients (debug deployments only)
    #[serde(default)]
    pub include_error_details: bool,
    /// Log request/response bodies
    #[serde(default)]
    pub log_bodies: bool,
}

/// Credential seeded through the admin service at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapUser {
    pub email: String,
    pub password: String,
    pub identity: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__COOKIE_NAME, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Signing key reference, scoped to the operator identity.
    pub fn signing_key_ref(&self) -> String {
        format!(
            "{}/{}",
            self.partition.system_identity, self.auth.signing_key_name
        )
    }

    /// Encryption key reference, scoped to the operator identity.
    pub fn encryption_key_ref(&self) -> String {
        format!(
            "{}/{}",
            self.partition.system_identity, self.auth.encryption_key_name
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key_name: default_signing_key_name(),
            encryption_key_name: default_encryption_key_name(),
            token_ttl_minutes: default_token_ttl_minutes(),
            min_password_length: default_min_password_length(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            system_identity: default_system_identity(),
            partition_id: default_partition_id(),
            api_keys: None,
        }
    }
}

fn default_http_port() -> u16 {
    3000
}

fn default_signing_key_name() -> String {
    "auth-signing".to_string()
}

fn default_encryption_key_name() -> String {
    "auth-encryption".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_min_password_length() -> usize {
    8
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

fn default_system_identity() -> String {
    "node-local".to_string()
}

fn default_partition_id() -> String {
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.http_port, 3000);
        assert_eq!(config.auth.signing_key_name, "auth-signing");
        assert_eq!(config.auth.encryption_key_name, "auth-encryption");
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.auth.min_password_length, 8);
        assert_eq!(config.auth.cookie_name, "access_token");
        assert!(!config.api.include_error_details);
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_key_refs_are_scoped_to_the_operator() {
        let config = Config::default();

        assert_eq!(config.signing_key_ref(), "node-local/auth-signing");
        assert_eq!(config.encryption_key_ref(), "node-local/auth-encryption");
    }
}
