//! Configuration for the Marquee engine
//!
//! Settings are static for the lifetime of the process: they are loaded
//! once at startup and passed into `ConnectionManager::open`, never held
//! as mutable global state.

mod manager;
mod settings;

pub use manager::ConfigManager;
pub use settings::{AppSettings, DatabaseSettings, TunnelSettings};
