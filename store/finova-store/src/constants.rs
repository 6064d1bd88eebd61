//! TigerStyle Constants
//!
//! Limits are enforced at the service boundary and asserted again by the
//! storage backends.

/// Maximum username length in bytes
pub const USERNAME_BYTES_MAX: usize = 64;

/// Maximum password length in bytes
pub const PASSWORD_BYTES_MAX: usize = 256;

/// Maximum profile image URL length in bytes
pub const IMAGE_URL_BYTES_MAX: usize = 2048;

/// Avatar assigned to newly registered users
pub const DEFAULT_AVATAR_URL: &str = "https://cdn-icons-png.flaticon.com/512/1320/1320457.png";

/// Balance credited to newly registered users
pub const STARTING_BALANCE: f64 = 500.0;

/// Maximum number of connections in the Postgres pool
pub const POOL_CONNECTIONS_MAX: u32 = 100;

/// Minimum number of idle connections kept in the Postgres pool
pub const POOL_CONNECTIONS_MIN: u32 = 10;

/// Seconds to wait when acquiring a pooled connection
pub const POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Default Postgres port
pub const POSTGRES_PORT_DEFAULT: u16 = 5432;
