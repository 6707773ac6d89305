//! HTTP server configuration

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub addr: SocketAddr,
    /// Upper bound on handling a single request. Payloads are tiny, so this
    /// stays small.
    pub request_timeout: Duration,
    /// How long in-flight requests may run after a shutdown signal
    pub shutdown_grace_period: Duration,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SERVER_ADDR`: bind address (default: "0.0.0.0:8080")
    /// - `SERVER_REQUEST_TIMEOUT`: request timeout in whole seconds, at
    ///   least 1 (default: 1)
    ///
    /// The shutdown grace period is three request timeouts.
    pub fn from_env() -> Result<Self> {
        let addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SERVER_ADDR: {}", e))?;

        let raw_timeout =
            std::env::var("SERVER_REQUEST_TIMEOUT").unwrap_or_else(|_| "1".to_string());
        let request_timeout = raw_timeout
            .parse::<u64>()
            .map_err(|e| {
                anyhow::anyhow!("Invalid SERVER_REQUEST_TIMEOUT {:?}: {}", raw_timeout, e)
            })?;
        if request_timeout == 0 {
            anyhow::bail!("SERVER_REQUEST_TIMEOUT must be at least one second");
        }
        let request_timeout = Duration::from_secs(request_timeout);

        Ok(ServerConfig {
            addr,
            request_timeout,
            shutdown_grace_period: request_timeout * 3,
        })
    }
}
