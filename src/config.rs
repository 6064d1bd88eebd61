//! Configuration
//!
//! TigerStyle: Every setting is a CLI flag with an environment fallback.
//! `.env` files are loaded before parsing.

use std::path::PathBuf;

use clap::Args;
use finova_store::{PostgresConfig, POSTGRES_PORT_DEFAULT};

use crate::services::FetchPolicy;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default bind address of the gadget store
pub const STORE_BIND_ADDRESS_DEFAULT: &str = "127.0.0.1:8080";

/// Default bind address of the statement API
pub const STATEMENTS_BIND_ADDRESS_DEFAULT: &str = "127.0.0.1:8081";

/// Default data directory (holds the export sealing key)
pub const DATA_DIR_DEFAULT: &str = "~/.finova";

// =============================================================================
// Database Settings
// =============================================================================

/// Gadget store database
#[derive(Args, Debug, Clone)]
pub struct StoreDbArgs {
    /// Database host
    #[arg(long = "db-host", env = "DATASOURCE_HOST", default_value = "db")]
    pub host: String,

    /// Database port
    #[arg(long = "db-port", env = "DATASOURCE_PORT", default_value_t = POSTGRES_PORT_DEFAULT)]
    pub port: u16,

    /// Database user
    #[arg(long = "db-user", env = "DATASOURCE_USERNAME", default_value = "admin")]
    pub user: String,

    /// Database password
    #[arg(
        long = "db-password",
        env = "DATASOURCE_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    /// Database name
    #[arg(long = "db-name", env = "DATASOURCE_NAME", default_value = "gadgets_store")]
    pub database: String,
}

impl StoreDbArgs {
    /// Connection settings for the backend
    pub fn to_postgres_config(&self) -> PostgresConfig {
        let mut config =
            PostgresConfig::new(&self.host, &self.user, &self.password, &self.database);
        config.port = self.port;
        config
    }
}

/// Statement database
#[derive(Args, Debug, Clone)]
pub struct StatementDbArgs {
    /// Database host
    #[arg(long = "db-host", env = "DB_HOST", default_value = "db")]
    pub host: String,

    /// Database port
    #[arg(long = "db-port", env = "DB_PORT", default_value_t = POSTGRES_PORT_DEFAULT)]
    pub port: u16,

    /// Database user
    #[arg(long = "db-user", env = "DB_USER", default_value = "appuser")]
    pub user: String,

    /// Database password
    #[arg(
        long = "db-password",
        env = "DB_PASS",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    /// Database name
    #[arg(long = "db-name", env = "DB_NAME", default_value = "finovabank")]
    pub database: String,
}

impl StatementDbArgs {
    /// Connection settings for the backend
    pub fn to_postgres_config(&self) -> PostgresConfig {
        let mut config =
            PostgresConfig::new(&self.host, &self.user, &self.password, &self.database);
        config.port = self.port;
        config
    }
}

// =============================================================================
// Server Settings
// =============================================================================

/// `finova store`
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// HTTP bind address
    #[arg(short, long, env = "FINOVA_STORE_BIND", default_value = STORE_BIND_ADDRESS_DEFAULT)]
    pub bind: String,

    /// Directory for the export sealing key
    #[arg(long, env = "FINOVA_DATA_DIR", default_value = DATA_DIR_DEFAULT)]
    pub data_dir: String,

    /// Use the in-memory backend with seed data instead of Postgres
    #[arg(long)]
    pub in_memory: bool,

    /// Let the image proxy reach loopback and private addresses
    #[arg(long, env = "FINOVA_ALLOW_PRIVATE_IMAGES")]
    pub allow_private_images: bool,

    #[command(flatten)]
    pub db: StoreDbArgs,
}

impl StoreArgs {
    /// Tilde-expanded data directory
    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    /// Image fetch limits
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            allow_private_hosts: self.allow_private_images,
            ..FetchPolicy::default()
        }
    }
}

/// `finova statements`
#[derive(Args, Debug, Clone)]
pub struct StatementsArgs {
    /// HTTP bind address
    #[arg(
        short,
        long,
        env = "FINOVA_STATEMENTS_BIND",
        default_value = STATEMENTS_BIND_ADDRESS_DEFAULT
    )]
    pub bind: String,

    /// Use the in-memory backend with seed data instead of Postgres
    #[arg(long)]
    pub in_memory: bool,

    #[command(flatten)]
    pub db: StatementDbArgs,
}

/// Which database `finova seed` fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedTarget {
    /// Gadget catalog
    Store,
    /// Bank statements
    Statements,
}

/// Expand `~` in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}
