use std::sync::Arc;

use tracing::{debug, info, warn};

use super::redirect::LoginRedirect;
use crate::error::{ClientError, ClientResult};
use crate::identity::IdentityGateway;
use crate::models::{AuthData, MessageResponse, RegisterRequest, RegisterResponse, User};
use crate::session::SessionStore;

/// The operations a front end performs on the user's behalf.
///
/// Each one composes an identity call with the session it affects; failures
/// are mirrored into the session's `error` field for display.
pub struct Auth {
    identity: Arc<dyn IdentityGateway>,
    session: Arc<SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl Auth {
    pub fn new(
        identity: Arc<dyn IdentityGateway>,
        session: Arc<SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Auth {
            identity,
            session,
            redirect,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Password login. Establishes the session on success.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let result = self
            .tracked(self.identity.login(email, password))
            .await;
        self.establish(result)
    }

    /// Social login with a Google ID token.
    pub async fn google_login(&self, id_token: &str) -> ClientResult<User> {
        let result = self.tracked(self.identity.google_login(id_token)).await;
        self.establish(result)
    }

    /// Creates an account. The session is left alone: the account has to be
    /// confirmed by email before it can log in.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse> {
        let response = self.tracked(self.identity.register(request)).await?;
        info!(user_id = %response.user.id, "Account registered");
        Ok(response)
    }

    pub async fn confirm_email(&self, token: &str) -> ClientResult<MessageResponse> {
        self.tracked(self.identity.confirm_email(token)).await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ClientResult<MessageResponse> {
        self.tracked(self.identity.reset_password(token, password))
            .await
    }

    /// Ends the session and sends the user to the login entry point.
    pub fn logout(&self) {
        self.session.logout();
        self.redirect.redirect_to_login();
    }

    /// Admits the caller only with a live, unexpired session; otherwise
    /// redirects to login.
    pub fn guard(&self) -> ClientResult<()> {
        if self.session.is_authenticated() && !self.session.is_expired() {
            return Ok(());
        }
        debug!(
            authenticated = self.session.is_authenticated(),
            "Guarded access denied"
        );
        self.redirect.redirect_to_login();
        Err(ClientError::AuthenticationRequired)
    }

    // Runs an identity call with the session's loading/error fields kept in step.
    async fn tracked<T>(
        &self,
        call: impl std::future::Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        self.session.set_loading(true);
        self.session.clear_error();
        let result = call.await;
        if let Err(e) = &result {
            warn!(error = %e, "Identity request failed");
            self.session.set_error(Some(display_message(e)));
        }
        self.session.set_loading(false);
        result
    }

    fn establish(&self, result: ClientResult<AuthData>) -> ClientResult<User> {
        let data = result?;
        let user = data.user.clone();
        self.session
            .set_auth(data.user, data.access_token, data.refresh_token);
        Ok(user)
    }
}

/// What to show the user for a failed call: the server's own message when
/// there is one.
fn display_message(err: &ClientError) -> String {
    match err {
        ClientError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
