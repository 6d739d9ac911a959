use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderName;
use http::HeaderValue;
use http::Method;
use http::StatusCode;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::response::ResponseBody;

/// Business logic behind a route.
///
/// Handlers receive the full mutable request context so they can read the
/// asserted identities and record state (such as the auth-operation hint) for
/// the post-stages. Dependencies are injected through the implementing
/// struct.
#[async_trait]
pub trait RouteHandler: Send + Sync + 'static {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<HandlerResponse, ApiError>;
}

/// Static route declaration, immutable once the pipeline is assembled.
pub struct RouteDescriptor {
    pub operation_id: String,
    pub method: Method,
    pub path: String,
    /// Skip token verification for this route
    pub skip_auth: bool,
    /// Skip partition resolution for this route
    pub skip_partition: bool,
    pub handler: Arc<dyn RouteHandler>,
}

impl RouteDescriptor {
    pub fn new(
        operation_id: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            method,
            path: path.into(),
            skip_auth: false,
            skip_partition: false,
            handler,
        }
    }

    pub fn with_skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn with_skip_partition(mut self) -> Self {
        self.skip_partition = true;
        self
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("operation_id", &self.operation_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("skip_auth", &self.skip_auth)
            .field("skip_partition", &self.skip_partition)
            .finish_non_exhaustive()
    }
}

/// What a route handler hands back to the route-invocation stage.
///
/// Status defaults are applied by the invoker: 200 for a response with a
/// body, 204 for an empty one.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: Option<StatusCode>,
    pub body: ResponseBody,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl HandlerResponse {
    pub fn json(value: Value) -> Self {
        Self {
            status: None,
            body: ResponseBody::Json(value),
            headers: Vec::new(),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: Some(StatusCode::NO_CONTENT),
            body: ResponseBody::None,
            headers: Vec::new(),
        }
    }

    pub fn binary(data: Vec<u8>, content_type: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            status: None,
            body: ResponseBody::Binary {
                data,
                content_type: content_type.into(),
                filename,
            },
            headers: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}
