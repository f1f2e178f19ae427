pub mod auth;
pub mod redirect;

// Re-export so callers can do "use crate::auth::{Auth, LoginRedirect};"
pub use auth::Auth;
pub use redirect::{LogRedirect, LoginRedirect};
