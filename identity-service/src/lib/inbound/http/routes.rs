use std::sync::Arc;

use async_trait::async_trait;
use auth::KeyStore;
use auth::TokenError;
use http::Method;
use pipeline::ApiError;
use pipeline::AuthOperation;
use pipeline::HandlerResponse;
use pipeline::RequestContext;
use pipeline::RouteDescriptor;
use pipeline::RouteHandler;
use serde::Deserialize;
use serde_json::json;

use crate::credential::errors::AuthError;
use crate::credential::ports::CredentialStore;
use crate::credential::service::AuthenticationService;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // One opaque message for every login failure cause.
            AuthError::LoginFailed(_) => ApiError::unauthorized("login failed"),
            AuthError::Token(token_error) => match token_error {
                TokenError::Missing
                | TokenError::Expired
                | TokenError::MissingSubject
                | TokenError::Invalid(_) => ApiError::unauthorized(token_error.to_string()),
                TokenError::SigningFailed(_) | TokenError::KeyStore(_) => {
                    ApiError::internal_with_cause("token backend failed", token_error)
                }
            },
            AuthError::Password(e) => ApiError::internal_with_cause("hashing backend failed", e),
            AuthError::Store(e) => ApiError::internal_with_cause("credential store failed", e),
            AuthError::CorruptSalt(e) => {
                ApiError::internal_with_cause("stored credential is corrupt", e)
            }
        }
    }
}

/// The authentication route table.
///
/// `/login` and `/logout` are reachable without a token; `/refresh` runs
/// behind the auth pre-stage so the verified inbound token is already stashed
/// in ProcessorState when the handler asks for it, which is what lets
/// cookie-borne clients refresh without a query parameter.
pub fn auth_routes<CS, KS>(
    service: Arc<AuthenticationService<CS, KS>>,
) -> Vec<Arc<RouteDescriptor>>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    let login = RouteDescriptor::new(
        "auth-login",
        Method::POST,
        "/login",
        Arc::new(LoginRoute {
            service: Arc::clone(&service),
        }),
    )
    .with_skip_auth();

    let logout = RouteDescriptor::new(
        "auth-logout",
        Method::GET,
        "/logout",
        Arc::new(LogoutRoute {
            service: Arc::clone(&service),
        }),
    )
    .with_skip_auth();

    let refresh = RouteDescriptor::new(
        "auth-refresh",
        Method::GET,
        "/refresh",
        Arc::new(RefreshRoute { service }),
    );

    vec![Arc::new(login), Arc::new(logout), Arc::new(refresh)]
}

#[derive(Debug, Deserialize)]
struct LoginRequestBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

struct LoginRoute<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    service: Arc<AuthenticationService<CS, KS>>,
}

#[async_trait]
impl<CS, KS> RouteHandler for LoginRoute<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    async fn handle(&self, ctx: &mut RequestContext) -> Result<HandlerResponse, ApiError> {
        let Some(body) = &ctx.request.body else {
            return Err(ApiError::validation("request body is required"));
        };
        let request: LoginRequestBody = serde_json::from_value(body.clone())
            .map_err(|_| ApiError::validation("email and password are required"))?;
        if request.email.is_empty() || request.password.is_empty() {
            return Err(ApiError::validation("email and password must not be empty"));
        }

        let issued = self.service.login(&request.email, &request.password).await?;

        ctx.state.auth_operation = Some(AuthOperation::Login);
        Ok(HandlerResponse::json(json!({
            "token": issued.token,
            "expiry": issued.expiry_ms,
        })))
    }
}

struct LogoutRoute<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    service: Arc<AuthenticationService<CS, KS>>,
}

#[async_trait]
impl<CS, KS> RouteHandler for LogoutRoute<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    async fn handle(&self, ctx: &mut RequestContext) -> Result<HandlerResponse, ApiError> {
        let token = supplied_token(ctx);
        self.service.logout(token.as_deref()).await?;

        ctx.state.auth_operation = Some(AuthOperation::Logout);
        Ok(HandlerResponse::no_content())
    }
}

struct RefreshRoute<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    service: Arc<AuthenticationService<CS, KS>>,
}

#[async_trait]
impl<CS, KS> RouteHandler for RefreshRoute<CS, KS>
where
    CS: CredentialStore,
    KS: KeyStore,
{
    async fn handle(&self, ctx: &mut RequestContext) -> Result<HandlerResponse, ApiError> {
        let token = supplied_token(ctx);
        let issued = self.service.refresh(token.as_deref()).await?;

        ctx.state.auth_operation = Some(AuthOperation::Refresh);
        Ok(HandlerResponse::json(json!({
            "token": issued.token,
            "expiry": issued.expiry_ms,
        })))
    }
}

/// Token from the query string, or the one the auth pre-stage extracted.
fn supplied_token(ctx: &RequestContext) -> Option<String> {
    ctx.request
        .query_param("token")
        .map(str::to_string)
        .or_else(|| ctx.state.auth_token.clone())
}
