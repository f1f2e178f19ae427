//! Reactive token repair around authenticated calls.
//!
//! ```text
//! START ─► DISPATCH(stored token) ─► not 401 ─────────────────────────► DONE
//!                 │
//!                 └─ 401 (first attempt) ─► REFRESH_ATTEMPT ─► ok ─► DISPATCH(new token) ─► DONE
//!                                                  │
//!                                                  └─ no refresh token / failure ─► LOGOUT ─► FAILED
//! ```
//!
//! The retried dispatch is final: a second 401 is handed back to the caller.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::auth::LoginRedirect;
use crate::error::{ClientError, ClientResult};
use crate::identity::IdentityGateway;
use crate::session::SessionStore;

/// Wraps a [`Transport`] so that authenticated calls survive an expired
/// access token.
pub struct RefreshCoordinator {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    identity: Arc<dyn IdentityGateway>,
    redirect: Arc<dyn LoginRedirect>,
    /// Serialises session repairs so concurrent 401s share one refresh.
    refresh_gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        identity: Arc<dyn IdentityGateway>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        RefreshCoordinator {
            transport,
            session,
            identity,
            redirect,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Dispatches `request`, refreshing the session and retrying once if the
    /// resource service answers 401.
    ///
    /// Non-401 responses are returned as they are, whatever their status.
    pub async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        if !request.requires_auth {
            return self.transport.send(&request, None).await;
        }

        let token = self.session.access_token();
        let response = self.transport.send(&request, token.as_deref()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            "Request unauthorized, repairing session"
        );
        let fresh_token = self.repair(token.as_deref()).await?;

        let retried = self.transport.send(&request, Some(&fresh_token)).await?;
        if retried.is_unauthorized() {
            warn!(
                method = %request.method,
                path = %request.path,
                "Request still unauthorized after refresh, giving up"
            );
        }
        Ok(retried)
    }

    /// Produces a token to retry with, or evicts the session.
    async fn repair(&self, stale_token: Option<&str>) -> ClientResult<String> {
        let _gate = self.refresh_gate.lock().await;

        // Someone else refreshed while we waited for the gate.
        match self.session.access_token() {
            Some(current) if Some(current.as_str()) != stale_token => {
                debug!("Session already refreshed by a concurrent request");
                return Ok(current);
            }
            // Logged out since dispatch; whoever did it already redirected.
            None if stale_token.is_some() => {
                debug!("Session ended by a concurrent request");
                return Err(ClientError::AuthenticationRequired);
            }
            _ => {}
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("No refresh token available, ending session");
            self.evict();
            return Err(ClientError::AuthenticationRequired);
        };

        let refreshed = self
            .identity
            .refresh(&refresh_token)
            .await
            .and_then(|refreshed| {
                if refreshed.access_token.is_empty() {
                    Err(ClientError::InvalidResponse(
                        "refresh response carried an empty access token".to_string(),
                    ))
                } else {
                    Ok(refreshed)
                }
            });

        match refreshed {
            Ok(refreshed) => {
                info!(
                    refresh_token_rotated = refreshed.refresh_token.is_some(),
                    "Access token refreshed"
                );
                let access_token = refreshed.access_token;
                self.session
                    .set_tokens(access_token.clone(), refreshed.refresh_token);
                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.evict();
                Err(ClientError::RefreshFailed(Box::new(e)))
            }
        }
    }

    fn evict(&self) {
        self.session.logout();
        self.redirect.redirect_to_login();
    }
}
