pub mod service;
pub mod transport;

pub use service::IssuedToken;
pub use service::TokenService;
pub use service::VerifiedToken;
pub use transport::extract_token;
pub use transport::ExtractedToken;
pub use transport::TokenLocation;
