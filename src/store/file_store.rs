use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::SnapshotStore;
use crate::config::FileStoreConfig;
use crate::error::ClientResult;
use crate::models::SessionSnapshot;

/// Keeps the snapshot as a JSON document on disk.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash mid-write never leaves a truncated snapshot behind.
/// On unix the file is readable by its owner only.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(config: &FileStoreConfig) -> Self {
        FileStore {
            path: config.path.clone(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session".into());
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> ClientResult<Option<SessionSnapshot>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: SessionSnapshot = serde_json::from_slice(&raw)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(parent)?;
        }

        let tmp = self.temp_path();
        let content = serde_json::to_vec_pretty(snapshot)?;
        if let Err(e) = write_private(&tmp, &content).and_then(|_| fs::rename(&tmp, &self.path)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(error = %cleanup, "Failed to remove temporary snapshot file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// The snapshot holds the refresh token: owner-only access.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir)
}

fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()?;

    // `mode` is filtered through the umask; pin it explicitly.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("todo-client-test-{}", uuid::Uuid::new_v4()));
        FileStore::new(&FileStoreConfig {
            path: dir.join("session.json"),
        })
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = temp_store();
        let snapshot = SessionSnapshot {
            user: Some(User::new(
                "u-1",
                "ana@example.com",
                Some("Ana".to_string()),
                Some(vec!["USER".to_string()]),
            )),
            access_token: Some("header.payload.sig".to_string()),
            refresh_token: Some("refresh-1".to_string()),
            authenticated: true,
        };

        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store();
        store.save(&SessionSnapshot::default()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let store = temp_store();
        store
            .save(&SessionSnapshot {
                access_token: Some("access".to_string()),
                refresh_token: Some("secret-refresh".to_string()),
                authenticated: true,
                ..Default::default()
            })
            .unwrap();

        let file_mode = fs::metadata(&store.path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir = store.path.parent().unwrap();
        let dir_mode = fs::metadata(dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode & 0o077, 0);

        // Overwriting keeps the mode.
        store.save(&SessionSnapshot::default()).unwrap();
        let file_mode = fs::metadata(&store.path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let store = temp_store();
        fs::create_dir_all(store.path.parent().unwrap()).unwrap();
        fs::write(&store.path, b"{not json").unwrap();
        assert!(store.load().is_err());
    }
}
