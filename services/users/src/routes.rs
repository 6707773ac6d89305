//! User service routes

use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{MessageResponse, NewUser, UpdateUser, UserQuery},
    repositories::UserRepository,
    state::AppState,
};

/// Create the router for the user service
pub fn create_router<R: UserRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/user", get(get_users::<R>).post(create_user::<R>))
        .route(
            "/api/user/:id",
            get(get_user::<R>)
                .put(update_user::<R>)
                .delete(delete_user::<R>),
        )
        .with_state(state)
}

/// Bound every request of `router` by `timeout`
///
/// A request that runs out of time is answered with a 408 envelope.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("Request timed out");
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("Unhandled middleware error: {}", err))
    }
}

/// Serialize `value` as the response body
///
/// Encoding failures become a 500 instead of tearing down the connection.
fn json_response<T: Serialize>(status: StatusCode, value: &T) -> ApiResult<Response> {
    let body = serde_json::to_vec(value)
        .map_err(|e| ApiError::Internal(format!("Failed to encode response: {}", e)))?;

    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json; charset=UTF-8")],
        body,
    )
        .into_response())
}

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user ID given: {}", raw)))
}

fn path_failure(rejection: PathRejection) -> ApiError {
    info!("Rejected request path: {}", rejection.body_text());
    ApiError::BadRequest("Invalid user ID given".to_string())
}

fn query_failure(rejection: QueryRejection) -> ApiError {
    info!("Rejected query string: {}", rejection.body_text());
    ApiError::BadRequest("Invalid query string given".to_string())
}

fn decode_failure(rejection: JsonRejection) -> ApiError {
    info!("Rejected request body: {}", rejection.body_text());
    ApiError::BadRequest("Failed to decode user from requests JSON".to_string())
}

/// Health check endpoint
pub async fn status() -> ApiResult<Response> {
    json_response(StatusCode::OK, &MessageResponse::message("Status is okay!"))
}

/// Get a user by ID
pub async fn get_user<R: UserRepository>(
    State(state): State<AppState<R>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(raw_id) = path.map_err(path_failure)?;
    let id = parse_id(&raw_id)?;

    let user = state.user_service.get_user(id).await.map_err(|e| {
        error!("Failed to get user {}: {}", id, e);
        ApiError::BadRequest(format!("Error getting user with ID: {}", id))
    })?;

    json_response(StatusCode::OK, &user)
}

/// Get all users, or a single user when `username` is given
pub async fn get_users<R: UserRepository>(
    State(state): State<AppState<R>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(query_failure)?;

    if let Some(username) = query.username {
        if username.is_empty() {
            return Err(ApiError::BadRequest(
                "Invalid, or no username given".to_string(),
            ));
        }

        let user = state
            .user_service
            .get_user_by_username(&username)
            .await
            .map_err(|e| {
                error!("Failed to get user {}: {}", username, e);
                ApiError::BadRequest(format!("Error getting user with username: {}", username))
            })?;

        return json_response(StatusCode::OK, &user);
    }

    let users = state.user_service.get_all_users().await.map_err(|e| {
        error!("Failed to get users: {}", e);
        ApiError::BadRequest("Unable to retrieve users".to_string())
    })?;

    json_response(StatusCode::OK, &users)
}

/// Create a new user
pub async fn create_user<R: UserRepository>(
    State(state): State<AppState<R>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(new_user) = payload.map_err(decode_failure)?;
    info!("Create user request for: {}", new_user.username);

    let user = state
        .user_service
        .create_user(new_user)
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            ApiError::BadRequest(format!("Unable to create new user: {}", e))
        })?;

    json_response(StatusCode::OK, &user)
}

/// Update the supplied fields of a user
pub async fn update_user<R: UserRepository>(
    State(state): State<AppState<R>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<Response> {
    let Path(raw_id) = path.map_err(path_failure)?;
    let id = parse_id(&raw_id)?;
    let Json(update) = payload.map_err(decode_failure)?;

    let user = state
        .user_service
        .update_user(id, update)
        .await
        .map_err(|e| {
            error!("Failed to update user {}: {}", id, e);
            ApiError::BadRequest(format!("Unable to update user with ID: {}", id))
        })?;

    json_response(StatusCode::OK, &user)
}

/// Soft-delete a user
pub async fn delete_user<R: UserRepository>(
    State(state): State<AppState<R>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(raw_id) = path.map_err(path_failure)?;
    let id = parse_id(&raw_id)?;

    state.user_service.delete_user(id).await.map_err(|e| {
        error!("Failed to delete user {}: {}", id, e);
        ApiError::BadRequest(format!("Unable to delete user with ID: {}", id))
    })?;

    json_response(
        StatusCode::OK,
        &MessageResponse::message(format!("Success deleting user: {}", id)),
    )
}
