//! Database module for handling PostgreSQL connections and operations
//!
//! This module provides connection pooling, configuration, startup retries,
//! schema migration and health checks for the PostgreSQL database.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database server host
    pub host: String,
    /// Database server port
    pub port: u16,
    /// Role used to connect
    pub username: String,
    /// Password of the role
    pub password: String,
    /// Name of the database holding the `users` table
    pub database: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How many times the initial connection is retried before giving up
    pub connect_retries: u32,
    /// Delay between two connection attempts
    pub retry_delay: Duration,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DB_HOST`: database host (default: "localhost")
    /// - `DB_PORT`: database port (default: 5432)
    /// - `DB_USERNAME`: database role (default: "postgres")
    /// - `DB_PASSWORD`: password of the role (default: "postgres")
    /// - `DB_TABLE`: database name (default: "postgres")
    /// - `DATABASE_MAX_CONNECTIONS`: maximum number of pooled connections (default: 10)
    /// - `DB_CONNECT_RETRIES`: retries of the initial connection (default: 3)
    /// - `DB_CONNECT_RETRY_DELAY`: seconds between retries (default: 5)
    pub fn from_env() -> DatabaseResult<Self> {
        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());

        let port = match env::var("DB_PORT") {
            Ok(raw) => raw.parse().map_err(|e| {
                DatabaseError::Configuration(format!("Invalid DB_PORT '{}': {}", raw, e))
            })?,
            Err(_) => 5432,
        };

        let username = env::var("DB_USERNAME").unwrap_or_else(|_| "postgres".to_string());
        let password = env::var("DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
        let database = env::var("DB_TABLE").unwrap_or_else(|_| "postgres".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let connect_retries = env::var("DB_CONNECT_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);

        let retry_delay = env::var("DB_CONNECT_RETRY_DELAY")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        Ok(Self {
            host,
            port,
            username,
            password,
            database,
            max_connections,
            connect_retries,
            retry_delay,
        })
    }

    /// Connection options for the configured server. TLS is disabled.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }
}

/// Initialize a PostgreSQL connection pool
///
/// The database container may still be starting when the service boots, so
/// the first connection is retried `config.connect_retries` times with a
/// fixed delay. Once connected the pool is pinged before being returned.
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<PgPool>` - PostgreSQL connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Starting new database connection"
    );

    let mut retries = config.connect_retries;
    let pool = loop {
        let attempt = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await;

        match attempt {
            Ok(pool) => break pool,
            Err(e) if retries > 0 => {
                warn!(
                    "Failed to connect to database - retries remaining: {} ({})",
                    retries, e
                );
                retries -= 1;
                tokio::time::sleep(config.retry_delay).await;
            }
            Err(e) => return Err(DatabaseError::Connection(e)),
        }
    };

    health_check(&pool).await?;
    info!("Database connection pool initialized successfully");

    Ok(pool)
}

/// Check database connectivity
///
/// # Arguments
///
/// * `pool` - PostgreSQL connection pool
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if the server answered the ping
pub async fn health_check(pool: &PgPool) -> DatabaseResult<bool> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DatabaseError::Connection)?;

    Ok(true)
}

/// Bring the schema up to date by running the embedded migrations once
pub async fn migrate(pool: &PgPool) -> DatabaseResult<()> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(DatabaseError::Migration)?;

    info!("Database migrations applied");
    Ok(())
}
