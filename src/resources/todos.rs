use std::sync::Arc;

use tracing::debug;

use crate::error::ClientResult;
use crate::models::todo::{TodoBody, TodoListBody};
use crate::models::{CreateTodo, Todo, UpdateTodo};
use crate::refresh::{ApiRequest, RefreshCoordinator};

/// Todo CRUD against the resource service. Every call goes through the
/// refresh coordinator.
#[derive(Clone)]
pub struct TodoService {
    coordinator: Arc<RefreshCoordinator>,
}

impl TodoService {
    pub fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
        TodoService { coordinator }
    }

    pub async fn list(&self) -> ClientResult<Vec<Todo>> {
        let body: TodoListBody = self
            .coordinator
            .execute(ApiRequest::get("/todos"))
            .await?
            .json()?;
        let todos: Vec<Todo> = body.into();
        debug!(count = todos.len(), "Fetched todos");
        Ok(todos)
    }

    pub async fn create(&self, todo: &CreateTodo) -> ClientResult<Todo> {
        let body: TodoBody = self
            .coordinator
            .execute(ApiRequest::post("/todos").json(todo)?)
            .await?
            .json()?;
        Ok(body.into())
    }

    pub async fn update(&self, id: i64, changes: &UpdateTodo) -> ClientResult<Todo> {
        let body: TodoBody = self
            .coordinator
            .execute(ApiRequest::put(format!("/todos/{}", id)).json(changes)?)
            .await?
            .json()?;
        Ok(body.into())
    }

    pub async fn toggle(&self, id: i64, completed: bool) -> ClientResult<Todo> {
        let changes = UpdateTodo {
            completed: Some(completed),
            ..Default::default()
        };
        self.update(id, &changes).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.coordinator
            .execute(ApiRequest::delete(format!("/todos/{}", id)))
            .await?
            .error_for_status()?;
        Ok(())
    }
}
