//! MySQL session opened through the tunnel's local forward

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use tracing::debug;

use crate::config::DatabaseSettings;
use crate::connection::Database;
use crate::error::{DatabaseError, DatabaseResult};

/// The database session for the lifetime of the process
///
/// Caps the pool at a single connection: the engine serves one search at a
/// time over one logical session, so there is nothing for a second
/// connection to do.
pub struct MySqlSession {
    pool: MySqlPool,
}

impl MySqlSession {
    /// Opens the session against the forward endpoint on `local_port`
    ///
    /// The connect target is always 127.0.0.1: the configured database host
    /// is where the bastion connects onward to, not this machine.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::OpenFailed` if the session cannot be
    /// established or authenticated.
    pub async fn open(settings: &DatabaseSettings, local_port: u16) -> DatabaseResult<Self> {
        debug!(local_port, database = %settings.database, "opening database session");

        // The wire is already encrypted by the tunnel and the endpoint is
        // loopback, so driver-level TLS stays off.
        let mut options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(local_port)
            .ssl_mode(MySqlSslMode::Disabled)
            .username(&settings.username)
            .database(&settings.database);

        if let Some(password) = settings.password.as_ref() {
            options = options.password(password.expose_secret());
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::OpenFailed(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Returns the statement-execution handle
    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Runs a trivial query to confirm the session is usable
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::QueryFailed` if execution fails.
    pub async fn probe(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Database for MySqlSession {
    async fn close(&mut self) -> DatabaseResult<()> {
        debug!("closing database session");
        self.pool.close().await;
        Ok(())
    }
}
