use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            other => Err(format!(
                "Invalid priority '{}'. Valid values: low, medium, high",
                other
            )),
        }
    }
}

/// A todo item as stored by the resource service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub completed: bool,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Partial update; only the fields that are set go over the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

// The service answers either with an envelope or with the bare payload.

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum TodoListBody {
    Wrapped { todos: Vec<Todo> },
    Bare(Vec<Todo>),
}

impl From<TodoListBody> for Vec<Todo> {
    fn from(body: TodoListBody) -> Self {
        match body {
            TodoListBody::Wrapped { todos } => todos,
            TodoListBody::Bare(todos) => todos,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum TodoBody {
    Wrapped { todo: Todo },
    Bare(Todo),
}

impl From<TodoBody> for Todo {
    fn from(body: TodoBody) -> Self {
        match body {
            TodoBody::Wrapped { todo } => todo,
            TodoBody::Bare(todo) => todo,
        }
    }
}
