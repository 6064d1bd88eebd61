//! Logging setup

use tracing_subscriber::EnvFilter;

/// Filter for a `-v` count when `RUST_LOG` is unset
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info,tower_http=debug",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber
pub fn init(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .init();
}
