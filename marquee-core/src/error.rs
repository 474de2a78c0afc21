//! Error types for Marquee
//!
//! This module defines all error types used throughout the Marquee engine,
//! providing descriptive error messages for configuration, tunnel, and
//! database operations. A search that matches zero rows is not represented
//! here: an empty listing is a normal, successfully completed search.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Marquee operations
#[derive(Debug, Error)]
pub enum MarqueeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Secure-tunnel errors
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),

    /// Database session and query errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to configuration file operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),
}

/// Errors establishing or tearing down the secure tunnel
///
/// These are fatal to startup and are never retried automatically.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// No local port could be reserved for the forward endpoint
    #[error("Failed to reserve a local forward port: {0}")]
    NoLocalPort(String),

    /// The ssh client process could not be spawned
    #[error("Failed to spawn ssh: {0}")]
    SpawnFailed(String),

    /// The ssh client exited before the forward came up
    /// (unreachable host, rejected credentials, forward failure)
    #[error("Tunnel could not be established: {0}")]
    EstablishFailed(String),

    /// The forward never started accepting within the configured timeout
    #[error("Tunnel did not become ready within {seconds} seconds")]
    EstablishTimeout {
        /// The configured connect timeout
        seconds: u64,
    },

    /// The tunnel process could not be terminated cleanly
    #[error("Failed to tear down tunnel: {0}")]
    TeardownFailed(String),
}

/// Errors opening the database session or executing a query
///
/// Not retried automatically; surfaced to the caller as a failed search
/// outcome.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database session could not be opened through the tunnel
    #[error("Failed to open database session: {0}")]
    OpenFailed(String),

    /// A query failed after the session was open
    /// (dropped connection, malformed execution)
    #[error("Query execution failed: {0}")]
    QueryFailed(String),
}

/// Result type alias for Marquee operations
pub type Result<T> = std::result::Result<T, MarqueeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for tunnel operations
pub type ConnectivityResult<T> = std::result::Result<T, ConnectivityError>;

/// Result type alias for database operations
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;
