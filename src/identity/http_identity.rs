use async_trait::async_trait;
use tracing::{debug, info};

use super::IdentityGateway;
use crate::config::ServiceConfig;
use crate::error::ClientResult;
use crate::models::auth::{GoogleLoginRequest, LoginRequest, RefreshRequest, ResetPasswordRequest};
use crate::models::{AuthData, MessageResponse, RefreshResponse, RegisterRequest, RegisterResponse};
use crate::refresh::{ApiRequest, HttpTransport, Transport};

/// Identity gateway speaking the JSON API of the auth server.
///
/// None of these calls carry the session's credentials.
pub struct HttpIdentityGateway {
    transport: HttpTransport,
}

impl HttpIdentityGateway {
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        info!("Creating identity gateway for '{}'", config.base_url);
        Ok(HttpIdentityGateway {
            transport: HttpTransport::new(config)?,
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        self.transport.send(&request.public(), None).await?.json()
    }
}

#[async_trait]
impl IdentityGateway for HttpIdentityGateway {
    async fn login(&self, email: &str, password: &str) -> ClientResult<AuthData> {
        debug!("Logging in '{}'", email);
        self.call(ApiRequest::post("/auth/login").json(&LoginRequest { email, password })?)
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse> {
        debug!("Registering '{}'", request.email);
        self.call(ApiRequest::post("/auth/register").json(request)?)
            .await
    }

    async fn google_login(&self, id_token: &str) -> ClientResult<AuthData> {
        self.call(ApiRequest::post("/auth/oauth/google").json(&GoogleLoginRequest { id_token })?)
            .await
    }

    async fn confirm_email(&self, token: &str) -> ClientResult<MessageResponse> {
        self.call(ApiRequest::get("/auth/confirm").query("token", token))
            .await
    }

    async fn reset_password(&self, token: &str, password: &str) -> ClientResult<MessageResponse> {
        self.call(
            ApiRequest::post("/auth/reset-password").json(&ResetPasswordRequest { token, password })?,
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse> {
        debug!("Exchanging refresh token for a new access token");
        self.call(ApiRequest::post("/auth/refresh").json(&RefreshRequest { refresh_token })?)
            .await
    }
}
