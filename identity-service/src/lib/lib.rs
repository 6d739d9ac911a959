pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod processors;

pub use domain::credential;
