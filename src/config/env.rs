//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Variables read by `Config::merge_from_env`, with a description and example
pub const SUPPORTED_ENV_VARS: &[(&str, &str, &str)] = &[
    ("PING_SERVER_IP", "Host name or IP of the echo server", "192.168.0.10"),
    ("PING_SERVER_PORT", "UDP port of the echo server (1-65535)", "5021"),
    ("PING_COUNT", "Number of probes to send", "4"),
    ("PING_PERIOD_MS", "Pause before each probe in milliseconds", "1000"),
    ("PING_TIMEOUT_MS", "Reply timeout in milliseconds (> 0)", "1000"),
    ("PING_LOCAL_PORT", "Local UDP port to bind, 0 for any", "5005"),
    ("ENABLE_COLOR", "Enable colored output", "true"),
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `path` into the process environment if it exists.
    ///
    /// Variables that are already set keep their value, so the real
    /// environment wins over the file. Returns whether a file was loaded.
    pub fn load_env_file(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Validate a single variable's format
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "PING_SERVER_IP" => {
                if value.is_empty() || value.chars().any(char::is_whitespace) {
                    return Err(AppError::config(format!("Invalid PING_SERVER_IP value '{}'", value)));
                }
            }
            "PING_SERVER_PORT" => {
                let port: u16 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_SERVER_PORT value '{}': {}", value, e)))?;
                if port == 0 {
                    return Err(AppError::config("PING_SERVER_PORT must be non-zero"));
                }
            }
            "PING_COUNT" => {
                value.parse::<u32>()
                    .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", value, e)))?;
            }
            "PING_PERIOD_MS" => {
                value.parse::<u64>()
                    .map_err(|e| AppError::config(format!("Invalid PING_PERIOD_MS value '{}': {}", value, e)))?;
            }
            "PING_TIMEOUT_MS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT_MS value '{}': {}", value, e)))?;
                if timeout == 0 {
                    return Err(AppError::config("PING_TIMEOUT_MS must be greater than 0"));
                }
            }
            "PING_LOCAL_PORT" => {
                value.parse::<u16>()
                    .map_err(|e| AppError::config(format!("Invalid PING_LOCAL_PORT value '{}': {}", value, e)))?;
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Check an env file's contents without loading it.
    ///
    /// Returns `None` when the file does not exist, otherwise one message
    /// per bad line.
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim().trim_start_matches("export ").trim();
                    let value = value.trim().trim_matches('"');
                    if let Err(e) = Self::validate_env_var(key, value) {
                        warnings.push(format!("Line '{}': {}", line, e));
                    }
                }
                None => warnings.push(format!("Line '{}': expected KEY=VALUE", line)),
            }
        }

        Ok(Some(warnings))
    }
}
