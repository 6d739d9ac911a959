use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::processor::RequestProcessor;
use crate::response::ResponseBody;
use crate::route::RouteDescriptor;

/// Request logging as a chain stage.
///
/// Stamps the start instant and a correlation id in `pre`, then logs method,
/// path, status and elapsed microseconds in `post`. Body logging is off by
/// default and meant for debugging deployments.
pub struct LoggingProcessor {
    log_bodies: bool,
}

impl LoggingProcessor {
    pub fn new(log_bodies: bool) -> Self {
        Self { log_bodies }
    }
}

#[async_trait]
impl RequestProcessor for LoggingProcessor {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn pre(
        &self,
        ctx: &mut RequestContext,
        _route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        let request_id = Uuid::new_v4();
        ctx.state.request_start = Some(Instant::now());
        ctx.state.request_id = Some(request_id);

        tracing::info!(
            request_id = %request_id,
            method = %ctx.request.method,
            path = %ctx.request.path,
            "request started"
        );

        if self.log_bodies {
            if let Some(body) = &ctx.request.body {
                tracing::debug!(request_id = %request_id, body = %body, "request body");
            }
        }

        Ok(())
    }

    async fn post(
        &self,
        ctx: &mut RequestContext,
        _route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        let elapsed_us = ctx
            .state
            .request_start
            .map(|start| start.elapsed().as_micros() as u64)
            .unwrap_or(0);
        let status = ctx
            .response
            .status()
            .map(|status| status.as_u16())
            .unwrap_or(0);
        let request_id = ctx.state.request_id.unwrap_or_default();

        tracing::info!(
            request_id = %request_id,
            method = %ctx.request.method,
            path = %ctx.request.path,
            status,
            elapsed_us,
            "request completed"
        );

        if self.log_bodies {
            if let ResponseBody::Json(body) = &ctx.response.body {
                tracing::debug!(request_id = %request_id, body = %body, "response body");
            }
        }

        Ok(())
    }
}
