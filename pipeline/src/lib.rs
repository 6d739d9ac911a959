//! Pluggable request-processing pipeline
//!
//! A transport-agnostic chain of processors that every request passes
//! through. Each processor contributes any of three hooks, and the chain
//! runs all `pre` hooks, then all `process` hooks, then all `post` hooks in
//! registration order. Stages communicate through a typed per-request
//! context; a stage that sets a response status short-circuits the normal
//! work of everything downstream.
//!
//! The dispatcher owning the transport converts its native request into a
//! [`PipelineRequest`], calls [`Pipeline::handle`], and writes the returned
//! [`PipelineResponse`] back out.

pub mod context;
pub mod error;
pub mod processor;
pub mod processors;
pub mod request;
pub mod response;
pub mod route;

// Re-export commonly used items
pub use context::AuthOperation;
pub use context::ProcessorState;
pub use context::RequestContext;
pub use context::RequestIdentity;
pub use error::ApiError;
pub use processor::Pipeline;
pub use processor::RequestProcessor;
pub use processors::LoggingProcessor;
pub use processors::RouteInvocationProcessor;
pub use request::PipelineRequest;
pub use response::PipelineResponse;
pub use response::ResponseBody;
pub use route::HandlerResponse;
pub use route::RouteDescriptor;
pub use route::RouteHandler;
