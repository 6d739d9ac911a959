use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::request::PipelineRequest;
use crate::response::PipelineResponse;
use crate::route::RouteDescriptor;

/// A pluggable stage of the request pipeline.
///
/// All three hooks are optional; the default bodies do nothing, so a
/// processor implements exactly the stages it participates in. Hooks must
/// check whether a response status has already been set and skip their normal
/// work if so; an error returned from a hook is converted into an error
/// response by the chain, not propagated to the transport.
#[async_trait]
pub trait RequestProcessor: Send + Sync + 'static {
    /// Stage name used in log lines.
    fn name(&self) -> &'static str;

    /// Runs before any route handler; identity assertion lives here.
    async fn pre(
        &self,
        _ctx: &mut RequestContext,
        _route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    /// The main stage; route invocation lives here.
    async fn process(
        &self,
        _ctx: &mut RequestContext,
        _route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    /// Runs after all main stages; response mutation lives here.
    async fn post(
        &self,
        _ctx: &mut RequestContext,
        _route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Ordered processor chain plus the immutable route table.
///
/// One request is handled by running every processor's `pre` hook in
/// registration order, then every `process` hook, then every `post` hook,
/// awaiting each stage before the next; requests are independent and may be
/// handled concurrently. Stage failures become error responses and the
/// remaining stages still run, so a request always leaves the chain with a
/// response.
pub struct Pipeline {
    routes: Vec<Arc<RouteDescriptor>>,
    processors: Vec<Arc<dyn RequestProcessor>>,
}

impl Pipeline {
    pub fn new(
        routes: Vec<Arc<RouteDescriptor>>,
        processors: Vec<Arc<dyn RequestProcessor>>,
    ) -> Self {
        Self { routes, processors }
    }

    /// Find the route matching a method and path, if any.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<&Arc<RouteDescriptor>> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|route| route.method == *method && normalize_path(&route.path) == path)
    }

    /// Run one request through the whole chain.
    pub async fn handle(&self, request: PipelineRequest) -> PipelineResponse {
        let route = self.match_route(&request.method, &request.path).cloned();
        let mut ctx = RequestContext::new(request);

        for processor in &self.processors {
            if let Err(error) = processor.pre(&mut ctx, route.as_ref()).await {
                fail_stage(&mut ctx, processor.name(), "pre", error);
            }
        }

        for processor in &self.processors {
            if let Err(error) = processor.process(&mut ctx, route.as_ref()).await {
                fail_stage(&mut ctx, processor.name(), "process", error);
            }
        }

        for processor in &self.processors {
            if let Err(error) = processor.post(&mut ctx, route.as_ref()).await {
                fail_stage(&mut ctx, processor.name(), "post", error);
            }
        }

        if ctx.response.status().is_none() {
            ctx.response
                .set_error(&ApiError::internal("no processor produced a response"), false);
        }

        ctx.response
    }
}

fn fail_stage(ctx: &mut RequestContext, processor: &'static str, stage: &'static str, error: ApiError) {
    tracing::error!(processor, stage, error = %error, "processor stage failed");
    if ctx.response.status().is_none() {
        ctx.response.set_error(&error, false);
    }
}

fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
