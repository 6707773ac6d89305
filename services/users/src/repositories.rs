//! Repositories for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;

use crate::models::{NewUser, UpdateUser, User};

#[cfg(test)]
pub mod memory;

const USER_COLUMNS: &str = "id, created_at, updated_at, deleted_at, username, password, \
                            first_name, last_name, email, telephone";

/// Persistence operations on the `users` table
///
/// Soft-deleted rows are invisible to every read.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a live user by ID
    async fn find_by_id(&self, id: u64) -> DatabaseResult<Option<User>>;

    /// Find a live user by username
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    /// Insert a new user whose password is already hashed
    async fn insert(&self, user: &NewUser) -> DatabaseResult<User>;

    /// Write the supplied, non-empty fields of `changes` to a live user.
    ///
    /// `changes.password` must already be hashed. Returns `None` when no
    /// live user has this ID.
    async fn update(&self, id: u64, changes: &UpdateUser) -> DatabaseResult<Option<User>>;

    /// Mark a user as deleted, returning the number of rows affected
    async fn soft_delete(&self, id: u64) -> DatabaseResult<u64>;

    /// All live users, ordered by ID
    async fn list(&self) -> DatabaseResult<Vec<User>>;
}

/// PostgreSQL backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Identifiers above i64::MAX cannot exist in a BIGSERIAL column.
fn db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: u64) -> DatabaseResult<Option<User>> {
        let Some(id) = db_id(id) else {
            return Ok(None);
        };

        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND deleted_at IS NULL"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn insert(&self, user: &NewUser) -> DatabaseResult<User> {
        info!("Inserting user: {}", user.username);

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, first_name, last_name, email, telephone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.telephone)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(&self, id: u64, changes: &UpdateUser) -> DatabaseResult<Option<User>> {
        let Some(id) = db_id(id) else {
            return Ok(None);
        };

        // Each column is only touched when a non-empty value was supplied.
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE(NULLIF($2, ''), username),
                password = COALESCE(NULLIF($3, ''), password),
                first_name = COALESCE(NULLIF($4, ''), first_name),
                last_name = COALESCE(NULLIF($5, ''), last_name),
                email = COALESCE(NULLIF($6, ''), email),
                telephone = COALESCE(NULLIF($7, ''), telephone),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(changes.password.as_deref())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.telephone.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn soft_delete(&self, id: u64) -> DatabaseResult<u64> {
        let Some(id) = db_id(id) else {
            return Ok(0);
        };

        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected())
    }

    async fn list(&self) -> DatabaseResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }
}
