//! Custom error types for the common library
//!
//! Every persistence failure surfaced by the shared database plumbing and
//! by repositories built on top of it is expressed as a [`DatabaseError`].

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while opening or pinging a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A uniqueness or other integrity constraint rejected the write
    #[error("Database constraint violation: {0}")]
    Constraint(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(#[source] MigrateError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query failure, pulling integrity violations out of the
    /// generic query bucket.
    pub fn from_query(err: SqlxError) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() || db_err.is_check_violation() => {
                DatabaseError::Constraint(db_err.message().to_string())
            }
            _ => DatabaseError::Query(err),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
