use std::sync::Arc;

use async_trait::async_trait;
use http::header::CONTENT_DISPOSITION;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use http::StatusCode;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::processor::RequestProcessor;
use crate::response::ResponseBody;
use crate::route::HandlerResponse;
use crate::route::RouteDescriptor;

/// The `process` stage that invokes the matched route handler.
///
/// This is the single point where handler errors are caught, classified into
/// a status code and serialized into the structured error body. Identity and
/// partition stages never reach this path; they set their rejections on the
/// response directly.
pub struct RouteInvocationProcessor {
    include_error_details: bool,
}

impl RouteInvocationProcessor {
    /// # Arguments
    /// * `include_error_details` - Echo internal error causes to clients
    ///   (debug deployments only); full causes are logged regardless
    pub fn new(include_error_details: bool) -> Self {
        Self {
            include_error_details,
        }
    }

    fn apply(&self, ctx: &mut RequestContext, handler_response: HandlerResponse) {
        let HandlerResponse {
            status,
            body,
            headers,
        } = handler_response;

        let status = status.unwrap_or(if body.is_empty() {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::OK
        });
        ctx.response.set_status(status);

        match &body {
            ResponseBody::Json(_) => {
                ctx.response
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            ResponseBody::Binary {
                content_type,
                filename,
                ..
            } => {
                if let Ok(value) = HeaderValue::from_str(content_type) {
                    ctx.response.headers.insert(CONTENT_TYPE, value);
                }
                if let Some(filename) = filename {
                    let disposition = format!("attachment; filename=\"{filename}\"");
                    if let Ok(value) = HeaderValue::from_str(&disposition) {
                        ctx.response.headers.insert(CONTENT_DISPOSITION, value);
                    }
                }
            }
            ResponseBody::None => {}
        }
        ctx.response.body = body;

        for (name, value) in headers {
            ctx.response.headers.append(name, value);
        }
    }
}

#[async_trait]
impl RequestProcessor for RouteInvocationProcessor {
    fn name(&self) -> &'static str {
        "route-invocation"
    }

    async fn process(
        &self,
        ctx: &mut RequestContext,
        route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        if ctx.response.status().is_some() {
            return Ok(());
        }

        let Some(route) = route else {
            ctx.response.set_error(
                &ApiError::not_found("route not found"),
                self.include_error_details,
            );
            return Ok(());
        };

        let handler = Arc::clone(&route.handler);
        match handler.handle(ctx).await {
            Ok(handler_response) => self.apply(ctx, handler_response),
            Err(error) => {
                if matches!(error, ApiError::Internal { .. }) {
                    tracing::error!(
                        operation = %route.operation_id,
                        error = %error,
                        "route handler failed"
                    );
                } else {
                    tracing::warn!(
                        operation = %route.operation_id,
                        error = %error,
                        "route handler rejected request"
                    );
                }
                ctx.response.set_error(&error, self.include_error_details);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::Method;
    use serde_json::json;
    use serde_json::Value;

    use super::*;
    use crate::request::PipelineRequest;
    use crate::route::RouteHandler;

    /// Handler that answers with a canned result.
    struct StubHandler {
        result: Result<HandlerResponse, ApiError>,
    }

    #[async_trait]
    impl RouteHandler for StubHandler {
        async fn handle(&self, _ctx: &mut RequestContext) -> Result<HandlerResponse, ApiError> {
            self.result.clone()
        }
    }

    fn route(result: Result<HandlerResponse, ApiError>) -> Arc<RouteDescriptor> {
        Arc::new(RouteDescriptor::new(
            "op",
            Method::GET,
            "/op",
            Arc::new(StubHandler { result }),
        ))
    }

    async fn invoke(
        processor: &RouteInvocationProcessor,
        route: Option<&Arc<RouteDescriptor>>,
    ) -> RequestContext {
        let mut ctx = RequestContext::new(PipelineRequest::new(Method::GET, "/op"));
        processor.process(&mut ctx, route).await.expect("process");
        ctx
    }

    #[tokio::test]
    async fn test_no_route_answers_not_found() {
        let processor = RouteInvocationProcessor::new(false);
        let ctx = invoke(&processor, None).await;

        assert_eq!(ctx.response.status(), Some(StatusCode::NOT_FOUND));
        let ResponseBody::Json(body) = &ctx.response.body else {
            panic!("expected json body");
        };
        assert_eq!(body["name"], "NotFound");
        assert_eq!(body["message"], "route not found");
    }

    #[tokio::test]
    async fn test_json_body_defaults_to_ok() {
        let processor = RouteInvocationProcessor::new(false);
        let route = route(Ok(HandlerResponse::json(json!({ "value": 1 }))));

        let ctx = invoke(&processor, Some(&route)).await;

        assert_eq!(ctx.response.status(), Some(StatusCode::OK));
        assert_eq!(
            ctx.response.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_empty_body_defaults_to_no_content() {
        let processor = RouteInvocationProcessor::new(false);
        let route = route(Ok(HandlerResponse {
            status: None,
            body: ResponseBody::None,
            headers: Vec::new(),
        }));

        let ctx = invoke(&processor, Some(&route)).await;

        assert_eq!(ctx.response.status(), Some(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn test_binary_body_headers() {
        let processor = RouteInvocationProcessor::new(false);
        let route = route(Ok(HandlerResponse::binary(
            vec![1, 2, 3],
            "application/octet-stream",
            Some("export.bin".to_string()),
        )));

        let ctx = invoke(&processor, Some(&route)).await;

        assert_eq!(ctx.response.status(), Some(StatusCode::OK));
        assert_eq!(
            ctx.response.headers.get(CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
        assert_eq!(
            ctx.response.headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"export.bin\""
        );
    }

    #[tokio::test]
    async fn test_handler_error_is_classified() {
        let processor = RouteInvocationProcessor::new(false);
        let route = route(Err(ApiError::validation("email is required")));

        let ctx = invoke(&processor, Some(&route)).await;

        assert_eq!(ctx.response.status(), Some(StatusCode::BAD_REQUEST));
        let ResponseBody::Json(body) = &ctx.response.body else {
            panic!("expected json body");
        };
        assert_eq!(body["name"], "ValidationError");
    }

    #[tokio::test]
    async fn test_internal_error_details_are_gated() {
        let route = route(Err(ApiError::internal_with_cause(
            "signing backend failed",
            "connection refused",
        )));

        let redacting = RouteInvocationProcessor::new(false);
        let ctx = invoke(&redacting, Some(&route)).await;
        let ResponseBody::Json(body) = &ctx.response.body else {
            panic!("expected json body");
        };
        assert_eq!(body["message"], "internal server error");
        assert_eq!(body.get("properties"), None::<&Value>);

        let detailed = RouteInvocationProcessor::new(true);
        let ctx = invoke(&detailed, Some(&route)).await;
        let ResponseBody::Json(body) = &ctx.response.body else {
            panic!("expected json body");
        };
        assert_eq!(body["message"], "signing backend failed");
        assert_eq!(body["properties"]["cause"], "connection refused");
    }

    #[tokio::test]
    async fn test_already_set_status_skips_handler() {
        struct PanicHandler;

        #[async_trait]
        impl RouteHandler for PanicHandler {
            async fn handle(
                &self,
                _ctx: &mut RequestContext,
            ) -> Result<HandlerResponse, ApiError> {
                panic!("handler must not run");
            }
        }

        let processor = RouteInvocationProcessor::new(false);
        let route = Arc::new(RouteDescriptor::new(
            "op",
            Method::GET,
            "/op",
            Arc::new(PanicHandler),
        ));

        let mut ctx = RequestContext::new(PipelineRequest::new(Method::GET, "/op"));
        ctx.response.set_status(StatusCode::UNAUTHORIZED);
        processor
            .process(&mut ctx, Some(&route))
            .await
            .expect("process");

        assert_eq!(ctx.response.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
