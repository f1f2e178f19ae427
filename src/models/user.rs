use serde::{Deserialize, Serialize};

/// The identity record returned by the identity service on login.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Display name, when the service knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub roles: Vec<String>,
}

impl User {
    /// Construct a new User with optional display name and roles.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: Option<String>,
        roles: Option<Vec<String>>,
    ) -> Self {
        User {
            id: id.into(),
            email: email.into(),
            name,
            roles: roles.unwrap_or_default(),
        }
    }

    /// Name to greet the user with, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
