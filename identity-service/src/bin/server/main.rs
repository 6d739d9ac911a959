use std::sync::Arc;

use auth::InMemoryKeyStore;
use auth::KeyStore;
use auth::KeyType;
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
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        signing_key_ref = %config.signing_key_ref(),
        token_ttl_minutes = config.auth.token_ttl_minutes,
        cookie_name = %config.auth.cookie_name,
        "Configuration loaded"
    );

    let key_store = Arc::new(InMemoryKeyStore::new());
    key_store
        .create_key(&config.signing_key_ref(), KeyType::Signing)
        .await?;
    key_store
        .create_key(&config.encryption_key_ref(), KeyType::Encryption)
        .await?;
    tracing::info!("Auth keys ready");

    let credential_store = Arc::new(InMemoryCredentialStore::new());

    if let Some(user) = &config.bootstrap {
        let admin = AuthenticationAdminService::new(
            Arc::clone(&credential_store),
            config.auth.min_password_length,
        );
        admin.create(&user.email, &user.password, &user.identity).await?;
        tracing::info!(email = %user.email, identity = %user.identity, "Bootstrap credential created");
    }

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
        Arc::new(LoggingProcessor::new(config.api.log_bodies)),
        Arc::new(PartitionProcessor::new(partition_resolver)),
        Arc::new(AuthTokenProcessor::new(
            Arc::clone(&key_store),
            config.signing_key_ref(),
            config.auth.cookie_name.clone(),
        )),
        Arc::new(RouteInvocationProcessor::new(
            config.api.include_error_details,
        )),
        Arc::new(AuthCookieProcessor::new(config.auth.cookie_name.clone())),
    ];

    let pipeline = Arc::new(Pipeline::new(auth_routes(auth_service), processors));

    let address = format!("0.0.0.0:{}", config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(listener, create_router(pipeline)).await?;

    Ok(())
}
