//! Application startup.
//!
//! Wires the snapshot store, session, gateways and refresh coordinator
//! together from the configuration.

use std::sync::Arc;
use tracing::info;

use crate::auth::{Auth, LogRedirect, LoginRedirect};
use crate::config::ConfigV1;
use crate::error::ClientResult;
use crate::identity::{HttpIdentityGateway, IdentityGateway};
use crate::refresh::{HttpTransport, RefreshCoordinator, Transport};
use crate::resources::TodoService;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::store::create_store;

/// Builds the application state with the HTTP gateways and a redirect that
/// logs the configured login route.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be constructed.
pub fn build_state(config: Arc<ConfigV1>) -> ClientResult<AppState> {
    let identity: Arc<dyn IdentityGateway> = Arc::new(HttpIdentityGateway::new(&config.identity)?);
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.resources)?);
    let redirect: Arc<dyn LoginRedirect> = Arc::new(LogRedirect::new(config.login_route.clone()));
    Ok(assemble(config, identity, transport, redirect))
}

/// Builds the application state around the given collaborators.
pub fn assemble(
    config: Arc<ConfigV1>,
    identity: Arc<dyn IdentityGateway>,
    transport: Arc<dyn Transport>,
    redirect: Arc<dyn LoginRedirect>,
) -> AppState {
    let store = create_store(&config.session_store);
    let session = Arc::new(SessionStore::open(store));

    info!(
        identity = %config.identity.base_url,
        resources = %config.resources.base_url,
        authenticated = session.is_authenticated(),
        "Client initialized"
    );

    let auth = Arc::new(Auth::new(identity.clone(), session.clone(), redirect.clone()));
    let coordinator = Arc::new(RefreshCoordinator::new(
        transport,
        session.clone(),
        identity,
        redirect,
    ));

    AppState {
        config,
        session,
        auth,
        todos: TodoService::new(coordinator),
    }
}
