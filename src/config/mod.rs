//! Configuration module for the Prefilheus admin backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted database service. `None` runs against the in-memory store.
    pub supabase_url: Option<String>,
    /// API key sent as `apikey` and bearer token
    pub supabase_key: Option<String>,
    /// Name of the remote collection
    pub table: String,
    /// Column holding the creation timestamp (`created_at` or `data_criacao`)
    pub timestamp_column: String,
    /// Row cap applied to the unfiltered initial view
    pub initial_limit: usize,
    /// Offset of the operators' calendar day from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Request timeout for remote calls
    pub http_timeout: Duration,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// A malformed configuration variable.
#[derive(Debug)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid value for {}: {:?}", self.var, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let supabase_url = non_empty_var("PREFILHEUS_SUPABASE_URL")
            .map(|url| url.trim_end_matches('/').to_string());
        let supabase_key = non_empty_var("PREFILHEUS_SUPABASE_KEY");

        let table = env::var("PREFILHEUS_TABLE").unwrap_or_else(|_| "prefilheus".to_string());
        let timestamp_column =
            env::var("PREFILHEUS_TIMESTAMP_COLUMN").unwrap_or_else(|_| "created_at".to_string());

        let initial_limit = parse_var("PREFILHEUS_INITIAL_LIMIT", 20)?;
        let utc_offset_minutes = parse_var("PREFILHEUS_UTC_OFFSET_MINUTES", 0)?;
        let http_timeout = Duration::from_secs(parse_var("PREFILHEUS_HTTP_TIMEOUT_SECS", 30)?);

        let bind_addr = parse_var(
            "PREFILHEUS_BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 8080)),
        )?;

        let log_level = env::var("PREFILHEUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            supabase_url,
            supabase_key,
            table,
            timestamp_column,
            initial_limit,
            utc_offset_minutes,
            http_timeout,
            bind_addr,
            log_level,
        })
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { var, value }),
        Err(_) => Ok(default),
    }
}
