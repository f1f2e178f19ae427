use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the session store configuration:
/// - enabled: if false, the session is not persisted (NoStore).
/// - backend: the actual store backend (file, memory).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StoreConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StoreBackend>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            enabled: true,
            backend: Some(StoreBackend::File(FileStoreConfig::default())),
        }
    }
}

/// The existing store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreBackend {
    #[serde(rename = "file")]
    File(FileStoreConfig),
    #[serde(rename = "memory")]
    Memory,
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    /// JSON file holding the session snapshot.
    pub path: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        FileStoreConfig {
            path: PathBuf::from(".todo-client/session.json"),
        }
    }
}
