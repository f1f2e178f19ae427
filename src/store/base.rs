use std::sync::Arc;

use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore, no_store::NoStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::error::ClientResult;
use crate::models::SessionSnapshot;

/// The SnapshotStore trait abstracts where the session snapshot lives
/// between process runs (load, save, clear).
///
/// Calls are synchronous: they run inside the session lock so that a
/// mutation and its durable copy are observed together.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<SessionSnapshot>>;
    fn save(&self, snapshot: &SessionSnapshot) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
    fn is_enabled(&self) -> bool {
        // NoStore returns false so startup logs can say the session won't survive a restart
        true
    }
}

/// Creates a concrete store implementation based on the StoreConfig.
/// If `enabled = false`, returns NoStore. Otherwise, picks the specified backend,
/// defaulting to an in-memory store when none is given.
pub fn create_store(config: &StoreConfig) -> Arc<dyn SnapshotStore> {
    if !config.enabled {
        info!("Session persistence is disabled. Using NoStore.");
        return Arc::new(NoStore::new());
    }

    match &config.backend {
        Some(StoreBackend::File(file_config)) => {
            info!(path = %file_config.path.display(), "Persisting session to file.");
            Arc::new(FileStore::new(file_config))
        }
        Some(StoreBackend::Memory) | None => {
            info!("Persisting session in memory for the lifetime of the process.");
            Arc::new(MemoryStore::new())
        }
    }
}
