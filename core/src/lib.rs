//! Persistence core for the todo service.
//!
//! # Overview
//! Owns the SQLite schema (a list table and an item table) and exposes the
//! create/read operations the HTTP layer needs through the [`TodoStore`]
//! trait. [`SqliteStore`] is the only implementation; it serializes writers
//! with a store-wide reader/writer lock.
//!
//! # Design
//! - Values returned from the store are detached copies; the tables are owned
//!   exclusively by the store.
//! - The store is an explicit object handed to its users, never a global.
//! - Missing lists surface as [`StoreError::NotFound`]; engine failures pass
//!   through in [`StoreError::Sqlite`].

pub mod error;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use store::{SqliteStore, TodoStore};
pub use types::{TodoItem, TodoList};
