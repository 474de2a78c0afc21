//! Marquee Core Library
//!
//! This crate provides the query and result-grouping engine for the Marquee
//! movie showtime finder: the paired lifecycle of an SSH tunnel and the
//! MySQL session opened through it, the parameterized title search, and the
//! fold of pre-sorted result rows into a grouped listing ready for display.

pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod models;
pub mod query;
pub mod tunnel;

pub use config::{AppSettings, ConfigManager, DatabaseSettings, TunnelSettings};
pub use connection::{ConnectionManager, Database, Tunnel};
pub use database::MySqlSession;
pub use error::{
    ConfigError, ConfigResult, ConnectivityError, ConnectivityResult, DatabaseError,
    DatabaseResult, MarqueeError, Result,
};
pub use models::{GroupedListing, Showtime, ShowtimeRow, TitleGroup};
pub use query::MovieQueryService;
pub use tunnel::SshTunnel;
