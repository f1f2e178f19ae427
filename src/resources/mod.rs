pub mod todos;

pub use todos::TodoService;
