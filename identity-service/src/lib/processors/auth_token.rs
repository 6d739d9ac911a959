use std::sync::Arc;

use async_trait::async_trait;
use auth::extract_token;
use auth::KeyStore;
use auth::TokenError;
use auth::TokenService;
use pipeline::ApiError;
use pipeline::RequestContext;
use pipeline::RequestProcessor;
use pipeline::RouteDescriptor;

/// Identity-asserting pre-stage.
///
/// For routes that require authentication, extracts the bearer token from the
/// `Authorization` header or the configured cookie, verifies it, and asserts
/// the token's subject as the request's user identity. The verified token and
/// its transport location are stashed in ProcessorState for the post-stages.
///
/// Verification failures are the expected path here: they set a 401 response
/// directly, which short-circuits the route handler without exception-style
/// unwinding.
pub struct AuthTokenProcessor<KS>
where
    KS: KeyStore,
{
    token_service: TokenService<KS>,
    signing_key_ref: String,
    cookie_name: String,
}

impl<KS> AuthTokenProcessor<KS>
where
    KS: KeyStore,
{
    pub fn new(
        key_store: Arc<KS>,
        signing_key_ref: impl Into<String>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            token_service: TokenService::new(key_store),
            signing_key_ref: signing_key_ref.into(),
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl<KS> RequestProcessor for AuthTokenProcessor<KS>
where
    KS: KeyStore,
{
    fn name(&self) -> &'static str {
        "auth-token"
    }

    async fn pre(
        &self,
        ctx: &mut RequestContext,
        route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        // Unmatched requests 404 downstream; exempt routes pass through.
        let Some(route) = route else {
            return Ok(());
        };
        if route.skip_auth || ctx.response.status().is_some() {
            return Ok(());
        }

        let Some(extracted) = extract_token(&ctx.request.headers, &self.cookie_name) else {
            ctx.response
                .set_error(&ApiError::unauthorized("missing authentication token"), false);
            return Ok(());
        };

        match self
            .token_service
            .verify(&self.signing_key_ref, Some(&extracted.token))
            .await
        {
            Ok(verified) => {
                ctx.identity.user_identity = verified.claims.sub;
                ctx.state.auth_token = Some(extracted.token);
                ctx.state.auth_token_location = Some(extracted.location);
            }
            Err(TokenError::KeyStore(e)) => {
                return Err(ApiError::internal_with_cause("signing key unavailable", e));
            }
            Err(error) => {
                tracing::warn!(
                    operation = %route.operation_id,
                    error = %error,
                    "token verification failed"
                );
                ctx.response
                    .set_error(&ApiError::unauthorized("invalid or expired token"), false);
            }
        }

        Ok(())
    }
}
