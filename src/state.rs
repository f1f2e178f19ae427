//! Shared application state.
//!
//! Contains everything a front end needs once startup is done: the
//! configuration, the session, and the services built on top of it.

use crate::auth::Auth;
use crate::config::ConfigV1;
use crate::resources::TodoService;
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared by every command.
///
/// Cloning is cheap; all members are handles onto the same session.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The process-wide session, rehydrated from the snapshot store.
    pub session: Arc<SessionStore>,
    /// Login, registration and the route guard.
    pub auth: Arc<Auth>,
    /// Todo CRUD, routed through the refresh coordinator.
    pub todos: TodoService,
}
