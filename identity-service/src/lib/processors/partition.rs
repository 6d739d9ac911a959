use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::ApiError;
use pipeline::RequestContext;
use pipeline::RequestProcessor;
use pipeline::RouteDescriptor;

/// Header clients present their api key in.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The partition a request was scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionAssignment {
    /// Tenant partition id isolating this customer's data and keys
    pub partition_id: String,
    /// Operator identity the partition is served under
    pub system_identity: String,
}

/// Maps an inbound api key to a partition.
#[async_trait]
pub trait PartitionResolver: Send + Sync + 'static {
    /// Resolve the partition for a request.
    ///
    /// # Arguments
    /// * `api_key` - The request's api key header value, if present
    ///
    /// # Returns
    /// The assignment, or None when the request cannot be scoped
    async fn resolve(&self, api_key: Option<&str>) -> Option<PartitionAssignment>;
}

/// Single-tenant resolver: every request lands in the configured partition,
/// api key or not.
pub struct StaticPartitionResolver {
    assignment: PartitionAssignment,
}

impl StaticPartitionResolver {
    pub fn new(assignment: PartitionAssignment) -> Self {
        Self { assignment }
    }
}

#[async_trait]
impl PartitionResolver for StaticPartitionResolver {
    async fn resolve(&self, _api_key: Option<&str>) -> Option<PartitionAssignment> {
        Some(self.assignment.clone())
    }
}

/// Multi-tenant resolver backed by a static api-key map.
pub struct ApiKeyPartitionResolver {
    assignments: HashMap<String, PartitionAssignment>,
}

impl ApiKeyPartitionResolver {
    pub fn new(assignments: HashMap<String, PartitionAssignment>) -> Self {
        Self { assignments }
    }
}

#[async_trait]
impl PartitionResolver for ApiKeyPartitionResolver {
    async fn resolve(&self, api_key: Option<&str>) -> Option<PartitionAssignment> {
        self.assignments.get(api_key?).cloned()
    }
}

/// Tenant-scoping pre-stage.
///
/// Resolves the request's partition through the injected resolver and records
/// it, together with the operator identity, for downstream stages. Requests
/// that cannot be scoped are rejected with 401 unless the route opts out.
pub struct PartitionProcessor {
    resolver: Arc<dyn PartitionResolver>,
}

impl PartitionProcessor {
    pub fn new(resolver: Arc<dyn PartitionResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl RequestProcessor for PartitionProcessor {
    fn name(&self) -> &'static str {
        "partition"
    }

    async fn pre(
        &self,
        ctx: &mut RequestContext,
        route: Option<&Arc<RouteDescriptor>>,
    ) -> Result<(), ApiError> {
        let Some(route) = route else {
            return Ok(());
        };
        if route.skip_partition || ctx.response.status().is_some() {
            return Ok(());
        }

        let api_key = ctx
            .request
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match self.resolver.resolve(api_key).await {
            Some(assignment) => {
                ctx.state.partition_id = Some(assignment.partition_id);
                ctx.identity.system_identity = Some(assignment.system_identity);
            }
            None => {
                ctx.response
                    .set_error(&ApiError::unauthorized("unknown or missing api key"), false);
            }
        }

        Ok(())
    }
}
