//! API models for request and response payloads
//!
//! Field names on the wire are PascalCase (`FirstName`, `CreatedAt`, ...)
//! and the identifier is exposed as `ID`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(rename = "ID")]
    #[sqlx(try_from = "i64")]
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub username: String,
    /// Always a password hash once the user has been stored
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
}

/// User creation payload, password still in plaintext
///
/// Missing fields decode as empty strings and are rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
}

/// Partial user update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

/// Query parameters accepted by `GET /api/user`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
}

/// Envelope for responses that carry no resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageResponse {
    pub message: String,
    pub error: String,
}

impl MessageResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: String::new(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            error: error.into(),
        }
    }
}
