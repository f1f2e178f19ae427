use tracing::warn;

/// The one effect the session manager has on the surrounding application:
/// sending the user back to the login entry point.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Redirect for headless front ends: records the route the user must visit.
pub struct LogRedirect {
    login_route: String,
}

impl LogRedirect {
    pub fn new(login_route: impl Into<String>) -> Self {
        LogRedirect {
            login_route: login_route.into(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }
}

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        warn!(route = %self.login_route, "Session ended, login required");
    }
}
