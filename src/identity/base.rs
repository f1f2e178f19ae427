use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{AuthData, MessageResponse, RefreshResponse, RegisterRequest, RegisterResponse};

/// The identity service as seen by the session manager.
///
/// Only `refresh` matters to token repair; the rest are surfaced to the
/// user as plain success or failure.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ClientResult<AuthData>;
    async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse>;
    async fn google_login(&self, id_token: &str) -> ClientResult<AuthData>;
    async fn confirm_email(&self, token: &str) -> ClientResult<MessageResponse>;
    async fn reset_password(&self, token: &str, password: &str) -> ClientResult<MessageResponse>;
    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse>;
}
