//! Custom error types for the user service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use thiserror::Error;

use crate::models::MessageResponse;

/// Failures of the user service layer
#[derive(Error, Debug)]
pub enum UserError {
    /// A field rule was violated; nothing was written
    #[error("{0}")]
    Validation(String),

    /// No live user matched the lookup
    #[error("{0}")]
    NotFound(String),

    /// The store rejected or failed the operation
    #[error("failed to {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: DatabaseError,
    },

    /// The password could not be hashed
    #[error("password failed to hash: {0}")]
    HashingFailed(String),
}

impl UserError {
    /// Attach the operation name to a store failure
    pub fn store(operation: &'static str) -> impl FnOnce(DatabaseError) -> Self {
        move |source| UserError::Store { operation, source }
    }
}

/// Type alias for service results
pub type UserResult<T> = Result<T, UserError>;

/// Custom error type for the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request did not finish within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, MessageResponse::error(msg)),
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                MessageResponse::error("Request timed out"),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MessageResponse::message("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
