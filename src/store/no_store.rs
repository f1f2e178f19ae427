use super::SnapshotStore;
use crate::error::ClientResult;
use crate::models::SessionSnapshot;

/// A store that remembers nothing: saves are accepted and dropped,
/// loads always find an empty slot.
pub struct NoStore;

impl NoStore {
    pub fn new() -> Self {
        NoStore
    }
}

impl Default for NoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for NoStore {
    fn load(&self) -> ClientResult<Option<SessionSnapshot>> {
        Ok(None)
    }

    fn save(&self, _snapshot: &SessionSnapshot) -> ClientResult<()> {
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_store_forgets_saved_snapshot() {
        let no_store = NoStore::new();
        let snapshot = SessionSnapshot {
            access_token: Some("token".to_string()),
            authenticated: true,
            ..Default::default()
        };

        no_store.save(&snapshot).unwrap();
        assert_eq!(no_store.load().unwrap(), None);
    }

    #[test]
    fn test_no_store_clear_succeeds() {
        assert!(NoStore::new().clear().is_ok());
    }
}
