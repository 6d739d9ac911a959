pub mod logging;
pub mod route_invoker;

pub use logging::LoggingProcessor;
pub use route_invoker::RouteInvocationProcessor;
