//! Library exports for todo-client, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod refresh;
pub mod resources;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
