//! Property-based tests for the configuration surface

use marquee_core::{AppSettings, ConfigManager};
use proptest::prelude::*;
use tempfile::TempDir;

// ========== Generators ==========

// Strategy for generating valid hostnames (non-empty)
fn arb_host() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,15}[a-z0-9])?(\\.[a-z0-9]([a-z0-9-]{0,15}[a-z0-9])?)*".prop_map(|s| s)
}

// Strategy for generating usernames
fn arb_username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(|s| s)
}

// Strategy for generating valid ports (non-zero)
fn arb_port() -> impl Strategy<Value = u16> {
    1u16..=65535u16
}

fn render_config(
    tunnel_host: &str,
    tunnel_port: u16,
    username: &str,
    db_host: &str,
    db_port: u16,
    database: &str,
) -> String {
    format!(
        "[tunnel]\n\
         host = \"{tunnel_host}\"\n\
         port = {tunnel_port}\n\
         username = \"{username}\"\n\
         \n\
         [database]\n\
         host = \"{db_host}\"\n\
         port = {db_port}\n\
         username = \"{username}\"\n\
         password = \"secret\"\n\
         database = \"{database}\"\n"
    )
}

// ========== Properties ==========

proptest! {
    #[test]
    fn settings_survive_a_trip_through_the_parser(
        tunnel_host in arb_host(),
        tunnel_port in arb_port(),
        username in arb_username(),
        db_host in arb_host(),
        db_port in arb_port(),
        database in arb_username(),
    ) {
        let doc = render_config(&tunnel_host, tunnel_port, &username, &db_host, db_port, &database);
        let settings: AppSettings = toml::from_str(&doc).unwrap();

        prop_assert_eq!(&settings.tunnel.host, &tunnel_host);
        prop_assert_eq!(settings.tunnel.port, tunnel_port);
        prop_assert_eq!(&settings.database.host, &db_host);
        prop_assert_eq!(settings.database.port, db_port);
        prop_assert_eq!(&settings.database.database, &database);
        prop_assert!(settings.database.password.is_some());
    }

    #[test]
    fn forward_args_always_target_the_configured_endpoint(
        tunnel_host in arb_host(),
        tunnel_port in arb_port(),
        username in arb_username(),
        db_host in arb_host(),
        db_port in arb_port(),
        local_port in arb_port(),
    ) {
        let doc = render_config(&tunnel_host, tunnel_port, &username, &db_host, db_port, "movies");
        let settings: AppSettings = toml::from_str(&doc).unwrap();
        let args = settings.tunnel.forward_args(local_port, &db_host, db_port);

        let forward = format!("127.0.0.1:{local_port}:{db_host}:{db_port}");
        prop_assert!(args.contains(&forward));
        prop_assert_eq!(args.last().unwrap(), &format!("{username}@{tunnel_host}"));
        prop_assert!(args.contains(&tunnel_port.to_string()));
    }
}

#[test]
fn settings_load_from_a_custom_config_dir() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());
    std::fs::write(
        manager.config_path(),
        render_config("bastion.example.edu", 22, "jvander", "db.internal", 3306, "movienight"),
    )
    .unwrap();

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings.tunnel.host, "bastion.example.edu");
    assert_eq!(settings.database.database, "movienight");
}
