use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenLocation;
use http::header::SET_COOKIE;
use http::HeaderValue;
use pipeline::ApiError;
use pipeline::AuthOperation;
use pipeline::RequestContext;
use pipeline::RequestProcessor;
use pipeline::ResponseBody;
use pipeline::RouteDescriptor;
use serde_json::Value;

const COOKIE_ATTRIBUTES: &str = "Secure; HttpOnly; SameSite=None; Path=/";

/// Token-transport post-stage.
///
/// Browser clients carry the token in a cookie, API clients in the
/// `Authorization` header, and the two must not be mixed: after a login or
/// refresh the fresh token is moved out of the JSON body into a `Set-Cookie`
/// header UNLESS the inbound token arrived via the `Authorization` header, in
/// which case the body is left alone and no cookie is set. Logout always
/// clears the cookie, whatever the token source.
pub struct AuthCookieProcessor {
    cookie_name: String,
}

impl AuthCookieProcessor {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    fn move_token_into_cookie(&self, ctx: &mut RequestContext) {
        let ResponseBody::Json(body) = &mut ctx.response.body else {
            return;
        };
        let Some(object) = body.as_object_mut() else {
            return;
        };
        let Some(token) = object.get("token").and_then(Value::as_str).map(String::from) else {
            return;
        };
        object.remove("token");

        let cookie = format!("{}={}; {}", self.cookie_name, token, COOKIE_ATTRIBUTES);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            ctx.response.headers.append(SET_COOKIE, value);
        }
    }

    fn clear_cookie(&self, ctx: &mut RequestContext) {
        let cookie = format!("{}=; Max-Age=0; {}", self.cookie_name, COOKIE_ATTRIBUTES);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            ctx.response.headers.append(SET_COOKIE, value);
        }
    }
}

#[async_trait]
impl RequestProcessor for AuthCookieProcessor {
    fn name(&self) -> &'static str {
        "auth-cookie"
    }

    async fn post(
        &self,
        ctx: &mut RequestContext,
        _route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        let Some(operation) = ctx.state.auth_operation else {
            return Ok(());
        };

        match operation {
            AuthOperation::Login | AuthOperation::Refresh => {
                if ctx.state.auth_token_location == Some(TokenLocation::Authorization) {
                    return Ok(());
                }
                self.move_token_into_cookie(ctx);
            }
            AuthOperation::Logout => self.clear_cookie(ctx),
        }

        Ok(())
    }
}
