pub mod base;
pub mod http_identity;

pub use base::IdentityGateway;
pub use http_identity::HttpIdentityGateway;
