//! Paired lifecycle of the secure tunnel and the database session
//!
//! The tunnel and the database session opened through it are one resource:
//! they come up together, and they go down together in reverse order of
//! acquisition. `ConnectionManager` owns both halves exclusively; a query
//! can only be attempted while the pair is live, and `close` consumes the
//! manager so teardown happens exactly once.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::AppSettings;
use crate::database::MySqlSession;
use crate::error::{ConnectivityResult, DatabaseResult, Result};
use crate::tunnel::SshTunnel;

/// A live tunnel endpoint with a locally bound forward port
pub trait Tunnel: Send {
    /// The local port the forward listens on
    fn local_port(&self) -> u16;

    /// Tears the tunnel down
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transport cannot be shut down
    /// cleanly.
    fn close(&mut self) -> ConnectivityResult<()>;
}

/// A live database session opened through a tunnel
#[async_trait]
pub trait Database: Send {
    /// Shuts the session down
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be shut down cleanly.
    async fn close(&mut self) -> DatabaseResult<()>;
}

/// Owner of the tunnel + database pair
///
/// The database session never outlives the tunnel it was opened through:
/// `open` brings the tunnel up first and tears it down again if the
/// database half fails, and `close` shuts the database down before the
/// tunnel. Searches borrow the manager, so the pair cannot be torn down
/// while a query is in flight.
#[derive(Debug)]
pub struct ConnectionManager<T = SshTunnel, D = MySqlSession> {
    tunnel: T,
    database: D,
}

impl<T: Tunnel, D: Database> ConnectionManager<T, D> {
    /// Sequences the two openers: tunnel first, database through its port
    ///
    /// The database opener is never invoked when the tunnel fails.
    async fn open_with<OT, TF, OD, DF>(open_tunnel: OT, open_database: OD) -> Result<Self>
    where
        OT: FnOnce() -> TF,
        TF: Future<Output = ConnectivityResult<T>>,
        OD: FnOnce(u16) -> DF,
        DF: Future<Output = DatabaseResult<D>>,
    {
        let tunnel = open_tunnel().await?;
        let database = open_database(tunnel.local_port()).await;
        Self::pair(tunnel, database)
    }

    /// Pairs an open tunnel with the outcome of the database open
    ///
    /// On a failed database open the tunnel is torn down before the error
    /// propagates, so a partial failure leaks nothing.
    fn pair(mut tunnel: T, database: DatabaseResult<D>) -> Result<Self> {
        match database {
            Ok(database) => Ok(Self { tunnel, database }),
            Err(err) => {
                if let Err(close_err) = tunnel.close() {
                    warn!("tunnel teardown after failed database open also failed: {close_err}");
                }
                Err(err.into())
            }
        }
    }

    /// Releases both halves: database session first, then the tunnel
    ///
    /// The tunnel is torn down even when the database close fails; the
    /// first failure is the one reported.
    ///
    /// # Errors
    ///
    /// Returns an error if either half cannot be shut down cleanly.
    pub async fn close(mut self) -> Result<()> {
        debug!("closing database session, then tunnel");
        let database = self.database.close().await;
        let tunnel = self.tunnel.close();
        database?;
        tunnel?;
        Ok(())
    }

    /// Returns the database half of the pair
    #[must_use]
    pub fn database(&self) -> &D {
        &self.database
    }
}

impl ConnectionManager {
    /// Establishes the tunnel, then the database session through it
    ///
    /// # Errors
    ///
    /// Returns `ConnectivityError` if the tunnel cannot be established and
    /// `DatabaseError` if the database session cannot be opened even though
    /// the tunnel succeeded; in the latter case the tunnel is torn down
    /// before the error propagates.
    pub async fn open(settings: &AppSettings) -> Result<Self> {
        Self::open_with(
            || SshTunnel::open(&settings.tunnel, &settings.database),
            |local_port| MySqlSession::open(&settings.database, local_port),
        )
        .await
    }

    /// Returns the statement-execution handle for the live session
    #[must_use]
    pub fn pool(&self) -> &sqlx::MySqlPool {
        self.database.pool()
    }
}
