//! Configuration loaded from YAML and `TODO_CLIENT_*` environment variables.
pub mod logging;
pub mod store;
pub mod types;

pub use logging::LoggingConfig;
pub use store::{FileStoreConfig, StoreBackend, StoreConfig};
pub use types::*;
