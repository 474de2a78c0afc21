//! Marquee CLI - search scheduled movies over the remote schedule store
//!
//! The display layer of the system: takes a title substring from argv,
//! hands it to the engine, and renders the grouped listing (or the failure)
//! it gets back.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use marquee_core::{
    AppSettings, ConfigManager, ConnectionManager, GroupedListing, MarqueeError, MovieQueryService,
};

/// Exit codes returned to the shell
mod exit_codes {
    /// Configuration or rendering failure
    pub const GENERAL_ERROR: i32 = 1;
    /// Tunnel or database failure
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// Marquee command-line interface for searching movie showtimes
#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about = "Find movies playing: search showtimes by title")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Search scheduled movies by title substring
    #[command(about = "List matching movies with their showtimes, grouped by title")]
    Search {
        /// Title substring to match (case-insensitive; empty matches everything)
        #[arg(default_value = "")]
        term: String,

        /// Output format for the listing
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Verify the tunnel and database connection end to end
    #[command(about = "Open the tunnel and database session, probe, and close")]
    Check,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented starting config file
    Init,
}

/// Output format for search results
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Titles with indented showtimes
    Table,
    /// JSON array of title groups
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search { term, format } => cmd_search(cli.config.as_deref(), &term, format),
        Commands::Check => cmd_check(cli.config.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Search command handler
fn cmd_search(config: Option<&Path>, term: &str, format: OutputFormat) -> Result<(), CliError> {
    let settings = load_settings(config)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))?;
    let listing = runtime.block_on(run_search(&settings, term))?;

    match format {
        OutputFormat::Table => print!("{}", format_table(&listing)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| CliError::Render(format!("Failed to serialize to JSON: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Opens the connection, runs one search, and releases the connection on
/// both the success and the failure path before reporting the outcome
async fn run_search(settings: &AppSettings, term: &str) -> Result<GroupedListing, MarqueeError> {
    let connection = ConnectionManager::open(settings).await?;

    let mut service = MovieQueryService::new(&connection);
    let outcome = service.search(term).await;

    let closed = connection.close().await;
    let listing = outcome?;
    closed?;
    Ok(listing)
}

/// Connectivity check command handler
fn cmd_check(config: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))?;
    runtime.block_on(async {
        let connection = ConnectionManager::open(&settings).await?;
        let probed = connection.database().probe().await;
        let closed = connection.close().await;
        probed?;
        closed?;
        Ok::<(), MarqueeError>(())
    })?;

    println!("Connection OK: tunnel and database session opened, probed, and closed.");
    Ok(())
}

/// Config init command handler
fn cmd_config_init() -> Result<(), CliError> {
    let manager = ConfigManager::new()
        .map_err(|e| CliError::Config(format!("Failed to locate config directory: {e}")))?;
    let path = manager
        .write_template()
        .map_err(|e| CliError::Config(e.to_string()))?;

    println!("Wrote starting config to {}", path.display());
    println!("Fill in your bastion and database details before searching.");
    Ok(())
}

/// Loads settings from the explicit path when given, the default config
/// directory otherwise
fn load_settings(config: Option<&Path>) -> Result<AppSettings, CliError> {
    let loaded = match config {
        Some(path) => ConfigManager::load_settings_from(path),
        None => ConfigManager::new().and_then(|manager| manager.load_settings()),
    };

    loaded.map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}

/// Renders a grouped listing as titles with indented showtimes
fn format_table(listing: &GroupedListing) -> String {
    if listing.is_empty() {
        return "No movies found.\n".to_string();
    }

    let mut out = String::new();
    for group in listing {
        let _ = writeln!(out, "{}", group.title);
        for showtime in &group.showtimes {
            let _ = writeln!(out, "    {showtime}");
        }
    }
    out
}

/// Errors reported to the user by the CLI
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine failure (tunnel, database, or query)
    #[error("{0}")]
    Engine(#[from] MarqueeError),

    /// Output rendering error
    #[error("{0}")]
    Render(String),

    /// Async runtime error
    #[error("{0}")]
    Runtime(String),
}

impl CliError {
    /// Returns the appropriate exit code for this error type
    const fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(MarqueeError::Connectivity(_) | MarqueeError::Database(_)) => {
                exit_codes::CONNECTION_FAILURE
            }
            Self::Engine(_) | Self::Config(_) | Self::Render(_) | Self::Runtime(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use marquee_core::{Showtime, TitleGroup};

    fn showtime(m: u32, d: u32, h: u32, min: u32) -> Showtime {
        Showtime::new(
            NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
            NaiveTime::from_hms_opt(h, min, 0).unwrap(),
        )
    }

    #[test]
    fn test_empty_listing_renders_no_movies_found() {
        let listing = GroupedListing::default();
        assert_eq!(format_table(&listing), "No movies found.\n");
    }

    #[test]
    fn test_table_groups_titles_with_indented_showtimes() {
        let listing = GroupedListing::from(vec![
            TitleGroup {
                title: "Dune".to_string(),
                showtimes: vec![showtime(10, 1, 19, 0), showtime(10, 1, 21, 30)],
            },
            TitleGroup {
                title: "Elio".to_string(),
                showtimes: vec![showtime(10, 2, 14, 0)],
            },
        ]);

        let table = format_table(&listing);
        assert_eq!(
            table,
            "Dune\n    10/01/24  7:00 PM\n    10/01/24  9:30 PM\nElio\n    10/02/24  2:00 PM\n"
        );
    }

    #[test]
    fn test_connection_failures_use_a_distinct_exit_code() {
        let engine = CliError::Engine(MarqueeError::Connectivity(
            marquee_core::ConnectivityError::EstablishTimeout { seconds: 10 },
        ));
        assert_eq!(engine.exit_code(), exit_codes::CONNECTION_FAILURE);

        let config = CliError::Config("missing".to_string());
        assert_eq!(config.exit_code(), exit_codes::GENERAL_ERROR);
    }
}
