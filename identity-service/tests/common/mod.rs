use std::collections::HashMap;
use std::sync::Arc;

use auth::InMemoryKeyStore;
use auth::KeyStore;
use auth::KeyType;
use auth::TokenService;
use identity_service::config::Config;
use identity_service::credential::admin::AuthenticationAdminService;
use identity_service::credential::service::AuthenticationService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::routes::auth_routes;
use identity_service::outbound::repositories::InMemoryCredentialStore;
use identity_service::processors::ApiKeyPartitionResolver;
use identity_service::processors::AuthCookieProcessor;
use identity_service::processors::AuthTokenProcessor;
use identity_service::processors::PartitionAssignment;
use identity_service::processors::PartitionProcessor;
use identity_service::processors::PartitionResolver;
use identity_service::processors::StaticPartitionResolver;
use pipeline::LoggingProcessor;
use pipeline::Pipeline;
use pipeline::RequestProcessor;
use pipeline::RouteInvocationProcessor;

/// Test application that spawns a real server on a random port.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub admin: AuthenticationAdminService<InMemoryCredentialStore>,
    pub key_store: Arc<InMemoryKeyStore>,
    pub signing_key_ref: String,
    pub cookie_name: String,
}

impl TestApp {
    /// Spawn with the default single-tenant partition.
    pub async fn spawn() -> Self {
        Self::spawn_with(None).await
    }

    /// Spawn with api-key based partition resolution.
    pub async fn spawn_with_api_keys(api_keys: HashMap<String, String>) -> Self {
        Self::spawn_with(Some(api_keys)).await
    }

    async fn spawn_with(api_keys: Option<HashMap<String, String>>) -> Self {
        let mut config = Config::default();
        config.partition.api_keys = api_keys;

        let key_store = Arc::new(InMemoryKeyStore::new());
        key_store
            .create_key(&config.signing_key_ref(), KeyType::Signing)
            .await
            .expect("Failed to create signing key");
        key_store
            .create_key(&config.encryption_key_ref(), KeyType::Encryption)
            .await
            .expect("Failed to create encryption key");

        let credential_store = Arc::new(InMemoryCredentialStore::new());
        let admin = AuthenticationAdminService::new(
            Arc::clone(&credential_store),
            config.auth.min_password_length,
        );

        let auth_service = Arc::new(AuthenticationService::new(
            Arc::clone(&credential_store),
            Arc::clone(&key_store),
            config.signing_key_ref(),
            config.auth.token_ttl_minutes,
        ));

        let partition_resolver: Arc<dyn PartitionResolver> = match &config.partition.api_keys {
            Some(api_keys) => Arc::new(ApiKeyPartitionResolver::new(
                api_keys
                    .iter()
                    .map(|(api_key, partition_id)| {
                        (
                            api_key.clone(),
                            PartitionAssignment {
                                partition_id: partition_id.clone(),
                                system_identity: config.partition.system_identity.clone(),
                            },
                        )
                    })
                    .collect(),
            )),
            None => Arc::new(StaticPartitionResolver::new(PartitionAssignment {
                partition_id: config.partition.partition_id.clone(),
                system_identity: config.partition.system_identity.clone(),
            })),
        };

        let processors: Vec<Arc<dyn RequestProcessor>> = vec![
            Arc::new(LoggingProcessor::new(false)),
            Arc::new(PartitionProcessor::new(partition_resolver)),
            Arc::new(AuthTokenProcessor::new(
                Arc::clone(&key_store),
                config.signing_key_ref(),
                config.auth.cookie_name.clone(),
            )),
            Arc::new(RouteInvocationProcessor::new(false)),
            Arc::new(AuthCookieProcessor::new(config.auth.cookie_name.clone())),
        ];

        let pipeline = Arc::new(Pipeline::new(auth_routes(auth_service), processors));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move { axum::serve(listener, create_router(pipeline)).await });

        Self {
            address,
            api_client: reqwest::Client::new(),
            admin,
            key_store,
            signing_key_ref: config.signing_key_ref(),
            cookie_name: config.auth.cookie_name,
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Token service signing against the same key store as the server.
    pub fn token_service(&self) -> TokenService<InMemoryKeyStore> {
        TokenService::new(Arc::clone(&self.key_store))
    }
}

/// Extract the token value from a response's `Set-Cookie` header.
pub fn cookie_token(response: &reqwest::Response, cookie_name: &str) -> Option<String> {
    let header = response.headers().get("set-cookie")?.to_str().ok()?;
    let (name, value) = header.split(';').next()?.split_once('=')?;
    (name == cookie_name && !value.is_empty()).then(|| value.to_string())
}
