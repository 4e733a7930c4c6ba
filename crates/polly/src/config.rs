use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "polly.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub sqlite_path: String,
    /// How long a writer waits for the SQLite lock, in milliseconds (default: 5,000)
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub sqlite_busy_timeout_ms: u64,
    /// Header carrying the caller's identity, set by the front proxy (default: "x-user-id")
    pub identity_header: String,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SQLITE_PATH` - SQLite database path (default: "polly.db")
    /// - `SQLITE_BUSY_TIMEOUT_MS` - SQLite lock wait in milliseconds (default: 5,000)
    /// - `IDENTITY_HEADER` - Identity header name (default: "x-user-id")
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        Self {
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "polly.db".to_string()),
            sqlite_busy_timeout_ms: env::var("SQLITE_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            identity_header: env::var("IDENTITY_HEADER")
                .ok()
                .map(|v| v.trim().to_ascii_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "x-user-id".to_string()),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Get the SQLite busy timeout as a Duration.
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub fn sqlite_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.sqlite_busy_timeout_ms)
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
