//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Top-level service configuration.
///
/// Loaded once at startup via [`AppConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Seconds before an HTTP request is aborted with 408.
    pub request_timeout_secs: u64,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://swapstop.db".to_string());

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
            database_connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            log_json: parse_env_bool("LOG_JSON", false),
        })
    }

    /// Connection acquire timeout as a [`Duration`].
    #[must_use]
    pub const fn database_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.database_connect_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            database_url: "sqlite://swapstop.db".to_string(),
            database_max_connections: 5,
            database_connect_timeout_secs: 5,
            request_timeout_secs: 30,
            log_json: false,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
