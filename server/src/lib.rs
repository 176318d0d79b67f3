//! HTTP front end for the todo service.
//!
//! # Design
//! Routing is done by [`PatternRouter`], mounted as the fallback of an axum
//! router so axum only provides the HTTP plumbing. The store is injected
//! through [`AppState`]; nothing here is global.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use todo_core::TodoStore;

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;

pub use config::Config;
pub use error::ApiError;
pub use handlers::AppState;
pub use router::{PathParams, PatternRouter, Template};

pub fn app(store: Arc<dyn TodoStore>) -> Router {
    PatternRouter::new()
        .route("/ping", handlers::ping)
        .route("/todo", handlers::get_all)
        .route("/todo/new", handlers::new_item)
        // literal before the `{id}` template it overlaps with
        .route("/todo/lists/new", handlers::new_list)
        .route("/todo/lists/{id}", handlers::get_list)
        .route("/todo/lists/{id}/new", handlers::new_item_in_list)
        .with_state(AppState::new(store))
}

pub async fn run(listener: TcpListener, store: Arc<dyn TodoStore>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}
