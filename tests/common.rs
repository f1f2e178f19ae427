#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use todo_client::auth::LoginRedirect;
use todo_client::config::{load_config_from, ConfigV1};
use todo_client::identity::HttpIdentityGateway;
use todo_client::refresh::HttpTransport;
use todo_client::startup::assemble;
use todo_client::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
}

/// Signs an access token that expires `ttl_seconds` from now (negative for
/// one that is already stale). The client never checks the signature.
pub fn access_token(sub: &str, ttl_seconds: i64) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        email: format!("{}@example.com", sub),
        exp: Utc::now().timestamp() + ttl_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"integration-secret"),
    )
    .expect("failed to sign token")
}

pub fn expired_token(sub: &str) -> String {
    access_token(sub, -60)
}

pub fn fresh_token(sub: &str) -> String {
    access_token(sub, 3600)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Counts how often the session was evicted to the login route.
#[derive(Default)]
pub struct RecordingRedirect {
    redirects: AtomicUsize,
}

impl RecordingRedirect {
    pub fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// A configuration pointing both services at mock servers, with the given
/// `session_store` block.
pub fn test_config(identity_url: &str, resources_url: &str, session_store: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
identity:
  base_url: "{}"
  timeout_in_ms: 3000
resources:
  base_url: "{}"
  timeout_in_ms: 3000
session_store:
{}
"#,
        identity_url, resources_url, session_store
    );
    load_config_from(Figment::new().merge(Yaml::string(&yaml))).expect("Failed to load config")
}

pub const MEMORY_STORE: &str = r#"  enabled: true
  type: memory"#;

/// A fresh directory under the system temp dir; nothing is created yet.
pub fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("todo-client-it-{}", uuid::Uuid::new_v4()))
}

/// `session_store` block persisting to `session.json` inside `dir`.
pub fn file_store_block(dir: &std::path::Path) -> String {
    format!(
        "  enabled: true\n  type: file\n  path: \"{}\"",
        dir.join("session.json").display()
    )
}

/// Builds the application state over real HTTP gateways with a recording
/// redirect.
pub fn build_app(config: ConfigV1) -> (AppState, Arc<RecordingRedirect>) {
    let identity = HttpIdentityGateway::new(&config.identity).expect("identity gateway");
    let transport = HttpTransport::new(&config.resources).expect("transport");
    let redirect = Arc::new(RecordingRedirect::default());
    let state = assemble(
        Arc::new(config),
        Arc::new(identity),
        Arc::new(transport),
        redirect.clone(),
    );
    (state, redirect)
}

pub fn todo_json(id: i64, title: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "completed": completed,
        "priority": "MEDIUM",
        "createdAt": "2026-10-01T09:00:00Z"
    })
}
