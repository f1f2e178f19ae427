pub mod auth;
pub mod session;
pub mod todo;
pub mod user;

pub use auth::{AuthData, MessageResponse, RefreshResponse, RegisterRequest, RegisterResponse};
pub use session::{SessionSnapshot, SessionStatus};
pub use todo::{CreateTodo, Priority, Todo, UpdateTodo};
pub use user::User;

use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` the same way as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
