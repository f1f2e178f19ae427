use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Prefix of environment variables that override file settings,
/// e.g. `TODO_CLIENT_IDENTITY__BASE_URL`.
pub const ENV_PREFIX: &str = "TODO_CLIENT_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: where the services live, where the session is kept,
/// and how to log.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Identity service (login, refresh, registration).
    pub identity: ServiceConfig,
    /// Resource service holding the todo collection.
    pub resources: ServiceConfig,
    #[serde(default)]
    pub session_store: StoreConfig,
    /// Where users are sent when their session is evicted.
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

/// Base URL and request timeout for one remote service.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ServiceConfig {
            base_url: base_url.into(),
            timeout_in_ms: default_timeout_in_ms(),
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_in_ms)
    }
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

fn default_login_route() -> String {
    "/login".to_string()
}

/// The YAML file at `path` overlaid with `TODO_CLIENT_*` environment variables.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a config from any figment, resolving the version tag.
pub fn load_config_from(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from `path`, exiting the process when it is missing or invalid.
pub fn load_config(path: &Path) -> ConfigV1 {
    match load_config_from(figment_for(path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// The JSON schema of the configuration file.
pub fn config_schema() -> serde_json::Result<String> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
