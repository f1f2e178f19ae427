//! Authenticated calls and their recovery from expired access tokens.

pub mod coordinator;
pub mod transport;

pub use coordinator::RefreshCoordinator;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
