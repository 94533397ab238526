//! PostgreSQL session source
//!
//! Owns the connection pool and hands out one [`PostgresSession`] per run.

use super::session::{map_error, PostgresSession};
use crate::adapters::database::traits::{QuerySession, SessionSource};
use crate::config::schema::PostgreSQLConfig;
use crate::config::secret::redact_connection_string;
use crate::domain::{Result, VigilError};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;

/// Pooled PostgreSQL session source
pub struct PostgresSessionSource {
    /// Connection pool
    pool: Pool,

    /// Connection string without credentials
    target: String,

    statement_timeout_ms: u64,
}

impl PostgresSessionSource {
    /// Create a new session source
    ///
    /// No connection is opened until [`SessionSource::acquire`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Configuration`] if the connection string cannot be
    /// parsed, the TLS connector cannot be built or the pool cannot be created.
    pub fn new(config: &PostgreSQLConfig) -> Result<Self> {
        let secret = config.connection_string.expose_secret();
        let mut pg_config: tokio_postgres::Config = secret.parse().map_err(|e| {
            VigilError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
        })?;
        pg_config.ssl_mode(ssl_mode(&config.ssl_mode)?);

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.ssl_mode == "disable" {
            Manager::from_config(pg_config, NoTls, manager_config)
        } else {
            let connector = native_tls::TlsConnector::builder().build().map_err(|e| {
                VigilError::Configuration(format!("Failed to build TLS connector: {e}"))
            })?;
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                VigilError::Configuration(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self {
            pool,
            target: redact_connection_string(secret.as_ref()),
            statement_timeout_ms: config.statement_timeout_seconds * 1000,
        })
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

#[async_trait]
impl SessionSource for PostgresSessionSource {
    async fn acquire(&self) -> Result<Box<dyn QuerySession>> {
        let client = self.pool.get().await.map_err(|e| {
            VigilError::Connectivity(format!("Failed to get connection from pool: {e}"))
        })?;

        client
            .batch_execute(&format!(
                "SET statement_timeout = {}",
                self.statement_timeout_ms
            ))
            .await
            .map_err(|e| {
                VigilError::Connectivity(format!(
                    "Failed to set statement timeout: {}",
                    map_error(e)
                ))
            })?;

        tracing::info!(target_db = %self.target, "PostgreSQL session acquired");
        Ok(Box::new(PostgresSession::new(client)))
    }

    fn describe(&self) -> String {
        self.target.clone()
    }
}

fn ssl_mode(mode: &str) -> Result<SslMode> {
    match mode {
        "disable" => Ok(SslMode::Disable),
        "prefer" => Ok(SslMode::Prefer),
        "require" => Ok(SslMode::Require),
        other => Err(VigilError::Configuration(format!(
            "Unsupported ssl_mode '{other}'"
        ))),
    }
}
