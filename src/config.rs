//! Server settings read from the environment.
//!
//! Storage settings live in [`crate::infrastructure::factory`]; this module
//! covers everything else the binary needs before it can serve.
//!
//! # Environment Variables
//!
//! - `HOST`: bind host (default: `localhost`)
//! - `PORT`: bind port (default: `8080`)
//! - `STORE_TIMEOUT_MS`: per-call store deadline in milliseconds (default: `5000`)
//! - `LOG_FORMAT`: `text` (default) | `json`

use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::ConfigurationError;
use crate::infrastructure::factory::non_empty_var;

/// Default bind host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default deadline for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::InvalidValue {
                name: "LOG_FORMAT",
                value: value.to_string(),
            }),
        }
    }
}

/// Settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Deadline applied to every store call made while serving a request.
    pub store_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Reads server settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `PORT`,
    /// `STORE_TIMEOUT_MS` or `LOG_FORMAT` does not parse.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(non_empty_var)
    }

    /// Reads server settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(value) => parse_port(&value)?,
            None => DEFAULT_PORT,
        };

        let store_timeout = match lookup("STORE_TIMEOUT_MS") {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_STORE_TIMEOUT,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            store_timeout,
            log_format,
        })
    }

    /// Returns the `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigurationError> {
    value
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue {
            name: "PORT",
            value: value.to_string(),
        })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigurationError> {
    match value.parse::<u64>() {
        Ok(milliseconds) if milliseconds > 0 => Ok(Duration::from_millis(milliseconds)),
        _ => Err(ConfigurationError::InvalidValue {
            name: "STORE_TIMEOUT_MS",
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
