use std::collections::HashMap;
use std::time::Instant;

use auth::TokenLocation;
use serde_json::Value;
use uuid::Uuid;

use crate::request::PipelineRequest;
use crate::response::PipelineResponse;

/// Authentication operation a route handler performed, recorded for the
/// response-shaping stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Login,
    Refresh,
    Logout,
}

/// Per-request scratch state shared across all stages of one traversal.
///
/// Created empty when the request enters the chain, dropped when the response
/// leaves it; never persisted or shared across requests. Well-known fields
/// are typed; `extensions` is the escape hatch for processors this crate does
/// not know about.
#[derive(Debug, Default)]
pub struct ProcessorState {
    /// Verified inbound token, stashed by the auth pre-stage
    pub auth_token: Option<String>,
    /// Where the inbound token was found
    pub auth_token_location: Option<TokenLocation>,
    /// Auth operation the route handler performed
    pub auth_operation: Option<AuthOperation>,
    /// Tenant partition resolved for this request
    pub partition_id: Option<String>,
    /// Set when the request entered the chain
    pub request_start: Option<Instant>,
    /// Correlation id for log lines
    pub request_id: Option<Uuid>,
    /// Untyped extension slots
    pub extensions: HashMap<String, Value>,
}

/// Identities asserted for the current request.
///
/// Populated progressively by identity-asserting pre-stages and consumed by
/// route handlers and authorization checks.
#[derive(Debug, Default)]
pub struct RequestIdentity {
    /// Operator/node identity the request is served under
    pub system_identity: Option<String>,
    /// Authenticated end-user identity (token subject)
    pub user_identity: Option<String>,
}

/// Everything a stage can see and mutate for one request.
#[derive(Debug)]
pub struct RequestContext {
    pub request: PipelineRequest,
    pub response: PipelineResponse,
    pub state: ProcessorState,
    pub identity: RequestIdentity,
}

impl RequestContext {
    pub fn new(request: PipelineRequest) -> Self {
        Self {
            request,
            response: PipelineResponse::new(),
            state: ProcessorState::default(),
            identity: RequestIdentity::default(),
        }
    }
}
