use serde::{Deserialize, Serialize};

use super::user::User;

/// The durable part of a session. Loading/error flags never end up here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub authenticated: bool,
}

impl SessionSnapshot {
    /// A snapshot claiming to be authenticated without an access token is
    /// treated as logged out.
    pub fn normalized(self) -> Self {
        if self.authenticated && self.access_token.is_none() {
            SessionSnapshot::default()
        } else {
            self
        }
    }
}

/// What subscribers see when the session changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user_id: Option<String>,
}
