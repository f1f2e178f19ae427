use std::sync::Mutex;

use super::SnapshotStore;
use crate::error::ClientResult;
use crate::models::SessionSnapshot;

/// Holds the snapshot in process memory. Survives a `SessionStore` being
/// dropped and reopened, not a process restart.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<SessionSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Starts out holding `snapshot`, as if a previous run had saved it.
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        MemoryStore {
            slot: Mutex::new(Some(snapshot)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionSnapshot>> {
        // The slot only ever holds a fully built value, so a poisoned lock is still consistent.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> ClientResult<Option<SessionSnapshot>> {
        Ok(self.slot().clone())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> ClientResult<()> {
        *self.slot() = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot() = None;
        Ok(())
    }
}
