pub mod auth_cookie;
pub mod auth_token;
pub mod partition;

pub use auth_cookie::AuthCookieProcessor;
pub use auth_token::AuthTokenProcessor;
pub use partition::ApiKeyPartitionResolver;
pub use partition::PartitionAssignment;
pub use partition::PartitionProcessor;
pub use partition::PartitionResolver;
pub use partition::StaticPartitionResolver;
