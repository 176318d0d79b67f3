//! HTTP-facing error taxonomy.
//!
//! Every failure becomes a status code plus a short plain-text body, set
//! together in one response.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_core::StoreError;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Log `cause` and collapse it into a 500 carrying `message`.
    pub fn internal(message: &'static str, cause: impl Display) -> Self {
        error!(error = %cause, "{message}");
        ApiError::Internal(message)
    }

    /// Map a store failure: a missing list stays distinguishable, anything
    /// else is an internal error described by `message`.
    pub fn from_store(message: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("Todo list {id} not found")),
            other => ApiError::internal(message, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
