//! Configuration data model and validation

use crate::defaults;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on the number of probes in one run
pub const MAX_COUNT: u32 = 1_000_000;

/// Upper bound on the pause between probes
pub const MAX_PERIOD_MS: u64 = 3_600_000;

/// Main application configuration, immutable once the run starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Host name or IP address of the echo server
    #[serde(default)]
    pub server_ip: String,

    /// UDP port of the echo server
    #[serde(default)]
    pub server_port: u16,

    /// Number of probes to send
    #[serde(default = "default_count")]
    pub count: u32,

    /// Pause before each probe, in milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// How long to wait for each reply, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Local UDP port the client binds (0 = ephemeral)
    #[serde(default = "default_local_port")]
    pub local_port: u16,

    /// Only count a reply when its first line echoes the probe's sequence
    #[serde(default)]
    pub strict_sequence: bool,

    /// Print the final summary as JSON instead of the two text lines
    #[serde(default)]
    pub json: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_ip: String::new(),
            server_port: 0,
            count: default_count(),
            period_ms: default_period_ms(),
            timeout_ms: default_timeout_ms(),
            local_port: default_local_port(),
            strict_sequence: false,
            json: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause before each probe
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Per-probe receive timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the configuration and return the first hard error
    pub fn validate(&self) -> Result<()> {
        if self.server_ip.trim().is_empty() {
            return Err(AppError::config("Server address is required (--server_ip=<host>)"));
        }

        if self.server_ip.chars().any(char::is_whitespace) {
            return Err(AppError::config(format!("Invalid server address '{}'", self.server_ip)));
        }

        if self.server_port == 0 {
            return Err(AppError::config("Server port is required and must be non-zero (--server_port=<port>)"));
        }

        if self.count > MAX_COUNT {
            return Err(AppError::config(format!("Count cannot exceed {}", MAX_COUNT)));
        }

        if self.period_ms > MAX_PERIOD_MS {
            return Err(AppError::config(format!("Period cannot exceed {} ms", MAX_PERIOD_MS)));
        }

        // A zero read timeout is rejected by the socket layer
        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0 ms"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from(|key| std::env::var(key).ok())
    }

    /// Merge values from any `PING_*`-style key lookup
    pub fn merge_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server_ip) = lookup("PING_SERVER_IP") {
            self.server_ip = server_ip.trim().to_string();
        }
        if let Some(port) = lookup("PING_SERVER_PORT") {
            self.server_port = parse_var("PING_SERVER_PORT", &port)?;
        }
        if let Some(count) = lookup("PING_COUNT") {
            self.count = parse_var("PING_COUNT", &count)?;
        }
        if let Some(period) = lookup("PING_PERIOD_MS") {
            self.period_ms = parse_var("PING_PERIOD_MS", &period)?;
        }
        if let Some(timeout) = lookup("PING_TIMEOUT_MS") {
            self.timeout_ms = parse_var("PING_TIMEOUT_MS", &timeout)?;
        }
        if let Some(local_port) = lookup("PING_LOCAL_PORT") {
            self.local_port = parse_var("PING_LOCAL_PORT", &local_port)?;
        }
        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = parse_var("ENABLE_COLOR", &enable_color)?;
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn default_count() -> u32 {
    defaults::DEFAULT_COUNT
}

fn default_period_ms() -> u64 {
    defaults::DEFAULT_PERIOD_MS
}

fn default_timeout_ms() -> u64 {
    defaults::DEFAULT_TIMEOUT_MS
}

fn default_local_port() -> u16 {
    defaults::DEFAULT_LOCAL_PORT
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}
