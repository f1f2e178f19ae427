use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::expiry;
use crate::models::{SessionSnapshot, SessionStatus, User};
use crate::store::{NoStore, SnapshotStore};

#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    authenticated: bool,
    // Transient, never persisted.
    loading: bool,
    error: Option<String>,
}

impl SessionState {
    fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        SessionState {
            user: snapshot.user,
            access_token: snapshot.access_token,
            refresh_token: snapshot.refresh_token,
            authenticated: snapshot.authenticated,
            ..Default::default()
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            authenticated: self.authenticated,
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            authenticated: self.authenticated,
            user_id: self.user.as_ref().map(|u| u.id.clone()),
        }
    }
}

/// The single source of truth for "who is logged in, with which tokens".
///
/// Every mutation takes the write lock, applies the change, writes the durable
/// snapshot and notifies subscribers before the lock is released, so readers
/// never observe a half-applied update. Share it behind an `Arc`.
pub struct SessionStore {
    state: RwLock<SessionState>,
    persistence: Arc<dyn SnapshotStore>,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionStore {
    /// Opens the session, rehydrating it from `persistence` when a snapshot exists.
    pub fn open(persistence: Arc<dyn SnapshotStore>) -> Self {
        let state = match persistence.load() {
            Ok(Some(snapshot)) => {
                let state = SessionState::from_snapshot(snapshot.normalized());
                if state.authenticated {
                    info!(
                        user_id = state.user.as_ref().map(|u| u.id.as_str()).unwrap_or("unknown"),
                        "Restored session from snapshot"
                    );
                } else {
                    debug!("Restored logged-out session from snapshot");
                }
                state
            }
            Ok(None) => {
                debug!("No session snapshot found, starting logged out");
                SessionState::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session snapshot, starting logged out");
                SessionState::default()
            }
        };

        if !persistence.is_enabled() {
            info!("Session persistence disabled; the session ends with the process");
        }

        let (status_tx, _) = watch::channel(state.status());
        SessionStore {
            state: RwLock::new(state),
            persistence,
            status_tx,
        }
    }

    /// A session that is never written anywhere.
    pub fn ephemeral() -> Self {
        SessionStore::open(Arc::new(NoStore::new()))
    }

    // -- Mutations

    /// Replaces the whole session after a successful login.
    pub fn set_auth(&self, user: User, access_token: String, refresh_token: String) {
        info!(user_id = %user.id, "Session established");
        self.mutate(|state| {
            state.user = Some(user);
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
            state.authenticated = true;
            state.error = None;
        });
    }

    /// Stores a refreshed access token. The refresh token is only replaced when
    /// a new, non-empty one is supplied.
    pub fn set_tokens(&self, access_token: String, refresh_token: Option<String>) {
        let rotated = refresh_token.as_deref().is_some_and(|t| !t.is_empty());
        debug!(refresh_token_rotated = rotated, "Session tokens updated");
        self.mutate(|state| {
            state.access_token = Some(access_token);
            if let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) {
                state.refresh_token = Some(refresh_token);
            }
            state.authenticated = true;
        });
    }

    /// Updates the identity only; tokens and the authenticated flag are untouched.
    pub fn set_user(&self, user: User) {
        self.mutate(|state| state.user = Some(user));
    }

    pub fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    pub fn set_error(&self, error: Option<String>) {
        self.write().error = error;
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    /// Forgets user and tokens and erases the durable snapshot. Safe to call
    /// when already logged out.
    pub fn logout(&self) {
        let mut state = self.write();
        if state.authenticated {
            info!(
                user_id = state.user.as_ref().map(|u| u.id.as_str()).unwrap_or("unknown"),
                "Session ended"
            );
        }
        state.user = None;
        state.access_token = None;
        state.refresh_token = None;
        state.authenticated = false;
        state.error = None;

        if let Err(e) = self.persistence.clear() {
            error!(error = %e, "Failed to erase session snapshot");
        }
        self.publish(&state);
    }

    // -- Queries

    /// True when there is no access token or it is past its `exp` claim.
    pub fn is_expired(&self) -> bool {
        expiry::is_expired(self.read().access_token.as_deref())
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().authenticated
    }

    pub fn loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// The fields that survive a restart, read atomically.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().snapshot()
    }

    /// Watch login/logout transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    // -- Internals

    fn mutate(&self, apply: impl FnOnce(&mut SessionState)) {
        let mut state = self.write();
        apply(&mut state);
        if let Err(e) = self.persistence.save(&state.snapshot()) {
            error!(error = %e, "Failed to persist session snapshot");
        }
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        let status = state.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    // Every writer leaves a complete state behind before it can panic, so a
    // poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn user() -> User {
        User::new(
            "u-1",
            "ana@example.com",
            Some("Ana".to_string()),
            Some(vec!["USER".to_string()]),
        )
    }

    fn logged_in(store: Arc<MemoryStore>) -> SessionStore {
        let session = SessionStore::open(store);
        session.set_auth(user(), "access-1".to_string(), "refresh-1".to_string());
        session
    }

    #[test]
    fn test_starts_logged_out() {
        let session = SessionStore::ephemeral();
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
        assert_eq!(session.access_token(), None);
        assert!(session.is_expired());
    }

    #[test]
    fn test_set_auth_persists_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let session = logged_in(store.clone());

        assert!(session.is_authenticated());
        assert_eq!(store.load().unwrap(), Some(session.snapshot()));
        assert_eq!(
            session.snapshot().access_token.as_deref(),
            Some("access-1")
        );
    }

    #[test]
    fn test_set_auth_clears_error() {
        let session = SessionStore::ephemeral();
        session.set_error(Some("Invalid credentials".to_string()));
        session.set_auth(user(), "a".to_string(), "r".to_string());
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_set_tokens_without_refresh_token_keeps_existing() {
        let session = logged_in(Arc::new(MemoryStore::new()));

        session.set_tokens("access-2".to_string(), None);
        assert_eq!(session.access_token().as_deref(), Some("access-2"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(session.user(), Some(user()));

        session.set_tokens("access-3".to_string(), Some(String::new()));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));

        session.set_tokens("access-4".to_string(), Some("refresh-2".to_string()));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-2"));
    }

    #[test]
    fn test_every_persisted_mutation_is_saved() {
        let store = Arc::new(MemoryStore::new());
        let session = logged_in(store.clone());

        session.set_tokens("access-2".to_string(), Some("refresh-2".to_string()));
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.access_token.as_deref(), Some("access-2"));
        assert_eq!(saved.refresh_token.as_deref(), Some("refresh-2"));
        assert!(saved.authenticated);

        let renamed = User::new("u-1", "ana@example.com", Some("Ana B.".to_string()), None);
        session.set_user(renamed.clone());
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.user, Some(renamed));
        assert_eq!(saved.access_token.as_deref(), Some("access-2"));

        // Transient fields leave the snapshot alone.
        session.set_loading(true);
        session.set_error(Some("oops".to_string()));
        assert_eq!(store.load().unwrap(), Some(session.snapshot()));
    }

    #[test]
    fn test_set_tokens_authenticates_without_user() {
        let session = SessionStore::ephemeral();
        session.set_tokens("access".to_string(), Some("refresh".to_string()));
        assert!(session.is_authenticated());
        assert_eq!(session.user(), None);
    }

    #[test]
    fn test_set_user_leaves_tokens_alone() {
        let session = SessionStore::ephemeral();
        session.set_user(user());
        assert_eq!(session.user(), Some(user()));
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_logout_clears_everything() {
        let store = Arc::new(MemoryStore::new());
        let session = logged_in(store.clone());
        session.set_error(Some("boom".to_string()));

        session.logout();

        assert_eq!(session.user(), None);
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert!(!session.is_authenticated());
        assert_eq!(session.error(), None);
        assert_eq!(store.load().unwrap(), None);

        // Idempotent
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_rehydrate_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let before = logged_in(store.clone()).snapshot();

        let reopened = SessionStore::open(store);
        assert_eq!(reopened.snapshot(), before);
        assert!(reopened.is_authenticated());
    }

    #[test]
    fn test_transient_fields_are_not_restored() {
        let store = Arc::new(MemoryStore::new());
        let session = logged_in(store.clone());
        session.set_loading(true);
        session.set_error(Some("oops".to_string()));

        let reopened = SessionStore::open(store);
        assert!(!reopened.loading());
        assert_eq!(reopened.error(), None);
    }

    #[test]
    fn test_inconsistent_snapshot_starts_logged_out() {
        let store = Arc::new(MemoryStore::with_snapshot(SessionSnapshot {
            user: Some(user()),
            access_token: None,
            refresh_token: Some("refresh".to_string()),
            authenticated: true,
        }));

        let session = SessionStore::open(store);
        assert!(!session.is_authenticated());
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_subscribers_see_login_and_logout() {
        let session = SessionStore::ephemeral();
        let mut rx = session.subscribe();
        assert!(!rx.borrow_and_update().authenticated);

        session.set_auth(user(), "a".to_string(), "r".to_string());
        assert!(rx.has_changed().unwrap());
        let status = rx.borrow_and_update().clone();
        assert!(status.authenticated);
        assert_eq!(status.user_id.as_deref(), Some("u-1"));

        // A token refresh does not change the status.
        session.set_tokens("a2".to_string(), None);
        assert!(!rx.has_changed().unwrap());

        session.logout();
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().authenticated);
    }
}
