//! Request handlers for the todo HTTP surface.
//!
//! Each handler checks the method, decodes the body if the route takes one,
//! runs one store operation on the blocking pool and encodes the result.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use todo_core::{StoreResult, TodoItem, TodoList, TodoStore};

use crate::error::ApiError;
use crate::router::PathParams;

/// Upper bound on request bodies; todo payloads are tiny.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[derive(Serialize)]
struct Pong {
    message: &'static str,
}

pub async fn ping(
    _state: AppState,
    req: Request,
    _params: PathParams,
) -> Result<Response, ApiError> {
    require_method(&req, Method::GET)?;
    json_response(StatusCode::OK, &Pong { message: "pong" }, "Failed to marshal pong")
}

pub async fn get_all(
    state: AppState,
    req: Request,
    _params: PathParams,
) -> Result<Response, ApiError> {
    require_method(&req, Method::GET)?;

    let all = run_store(&state, "Failed to fetch todo lists", |store| store.get_all()).await?;
    json_response(StatusCode::OK, &all, "Failed to marshal todo lists")
}

pub async fn new_item(
    state: AppState,
    req: Request,
    _params: PathParams,
) -> Result<Response, ApiError> {
    require_method(&req, Method::POST)?;

    let item: TodoItem = read_json(req).await?;
    run_store(&state, "Failed to create todo item", move |store| store.post(&item)).await?;
    Ok((StatusCode::CREATED, "Todo item created").into_response())
}

pub async fn get_list(
    state: AppState,
    req: Request,
    params: PathParams,
) -> Result<Response, ApiError> {
    require_method(&req, Method::GET)?;

    let id = list_id(&params)?;
    let list = run_store(&state, "Failed to get the todo list", move |store| {
        store.get_list_by_id(id)
    })
    .await?;
    json_response(StatusCode::OK, &list, "Failed to marshal the todo list")
}

pub async fn new_item_in_list(
    state: AppState,
    req: Request,
    params: PathParams,
) -> Result<Response, ApiError> {
    require_method(&req, Method::POST)?;

    let id = list_id(&params)?;
    let item: TodoItem = read_json(req).await?;
    run_store(&state, "Failed to add item to the list", move |store| {
        store.add_item_to_list(id, &item)
    })
    .await?;
    Ok((StatusCode::CREATED, "Item added successfully").into_response())
}

pub async fn new_list(
    state: AppState,
    req: Request,
    _params: PathParams,
) -> Result<Response, ApiError> {
    require_method(&req, Method::POST)?;

    // Items in the body are not persisted; a new list always starts empty.
    let list: TodoList = read_json(req).await?;
    let id = run_store(&state, "Failed to create the todo list", move |store| {
        store.create_list(&list)
    })
    .await?;
    let created = TodoList {
        id,
        todo_items: Vec::new(),
    };
    json_response(StatusCode::CREATED, &created, "Failed to marshal the todo list")
}

fn require_method(req: &Request, expected: Method) -> Result<(), ApiError> {
    if req.method() == expected {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed)
    }
}

fn list_id(params: &PathParams) -> Result<i64, ApiError> {
    params
        .get("id")
        .and_then(|raw| raw.parse().ok())
        .ok_or(ApiError::BadRequest("Invalid list id"))
}

async fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ApiError> {
    let bytes = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::BadRequest("Invalid request payload"))?;
    serde_json::from_slice(&bytes).map_err(|_| ApiError::BadRequest("Invalid request payload"))
}

fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
    message: &'static str,
) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value).map_err(|err| ApiError::internal(message, err))?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], Body::from(body)).into_response())
}

/// Run a blocking store call off the async workers.
async fn run_store<T, F>(state: &AppState, message: &'static str, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn TodoStore) -> StoreResult<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    match tokio::task::spawn_blocking(move || op(store.as_ref())).await {
        Ok(result) => result.map_err(|err| ApiError::from_store(message, err)),
        Err(err) => Err(ApiError::internal(message, err)),
    }
}
