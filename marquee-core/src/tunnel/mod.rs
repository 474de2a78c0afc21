//! SSH tunnel to the bastion host
//!
//! The database host is only reachable from the bastion, so the engine
//! spawns the system ssh client with a local forward and owns the child
//! process for the lifetime of the connection. Readiness is probed by
//! connecting to the forward's local port rather than parsing ssh output.

use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::{DatabaseSettings, TunnelSettings};
use crate::connection::Tunnel;
use crate::error::{ConnectivityError, ConnectivityResult};

/// Poll interval while waiting for the forward to start accepting
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A running ssh child process holding a local forward to the database
pub struct SshTunnel {
    child: Child,
    local_port: u16,
}

impl SshTunnel {
    /// Establishes the tunnel and waits for the forward to accept
    ///
    /// # Errors
    ///
    /// Returns `ConnectivityError` if no local port can be reserved, the
    /// ssh client cannot be spawned, the client exits before the forward
    /// comes up (unreachable host, rejected credentials), or the forward
    /// does not accept within the configured timeout. No child process is
    /// left running on any failure path.
    pub async fn open(
        tunnel: &TunnelSettings,
        database: &DatabaseSettings,
    ) -> ConnectivityResult<Self> {
        let local_port = reserve_local_port()?;
        let args = tunnel.forward_args(local_port, &database.host, database.port);
        debug!(host = %tunnel.host, local_port, "starting ssh tunnel");

        let child = Command::new("ssh")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ConnectivityError::SpawnFailed(e.to_string()))?;

        // From here on the child is owned; an early return drops `session`
        // and the Drop impl reaps it.
        let mut session = Self { child, local_port };
        session
            .wait_until_ready(Duration::from_secs(tunnel.connect_timeout_secs))
            .await?;

        debug!(local_port, "tunnel ready");
        Ok(session)
    }

    async fn wait_until_ready(&mut self, deadline: Duration) -> ConnectivityResult<()> {
        let started = Instant::now();
        loop {
            if let Some(status) = self
                .child
                .try_wait()
                .map_err(|e| ConnectivityError::EstablishFailed(e.to_string()))?
            {
                return Err(ConnectivityError::EstablishFailed(format!(
                    "ssh exited with {status} before the forward came up"
                )));
            }

            let probe = timeout(
                READY_POLL_INTERVAL,
                TcpStream::connect(("127.0.0.1", self.local_port)),
            )
            .await;
            if matches!(probe, Ok(Ok(_))) {
                return Ok(());
            }

            if started.elapsed() >= deadline {
                return Err(ConnectivityError::EstablishTimeout {
                    seconds: deadline.as_secs(),
                });
            }
            sleep(READY_POLL_INTERVAL).await;
        }
    }
}

impl Tunnel for SshTunnel {
    fn local_port(&self) -> u16 {
        self.local_port
    }

    fn close(&mut self) -> ConnectivityResult<()> {
        debug!(local_port = self.local_port, "closing ssh tunnel");
        if let Ok(Some(_)) = self.child.try_wait() {
            // ssh already exited on its own
            return Ok(());
        }

        self.child
            .kill()
            .map_err(|e| ConnectivityError::TeardownFailed(e.to_string()))?;
        self.child
            .wait()
            .map_err(|e| ConnectivityError::TeardownFailed(e.to_string()))?;
        Ok(())
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        // Backstop for abnormal exit paths; the orderly path is
        // ConnectionManager::close.
        if matches!(self.child.try_wait(), Ok(None)) {
            warn!(
                local_port = self.local_port,
                "ssh tunnel dropped while still running; killing child"
            );
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Reserves an ephemeral local port for the forward endpoint
///
/// Binds to port 0, notes the assigned port, and releases it for ssh to
/// claim.
fn reserve_local_port() -> ConnectivityResult<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .map_err(|e| ConnectivityError::NoLocalPort(e.to_string()))?;
    let port = listener
        .local_addr()
        .map_err(|e| ConnectivityError::NoLocalPort(e.to_string()))?
        .port();
    Ok(port)
}
