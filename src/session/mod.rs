//! Session state and access token expiry.

pub mod expiry;
pub mod session_store;

pub use expiry::{is_expired, is_expired_at};
pub use session_store::SessionStore;
