//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};
use std::path::PathBuf;

/// Configuration parser that layers defaults, the `.env` file, the
/// environment and CLI flags, in increasing priority
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser reading `.env` from the working directory
    pub fn new(cli: Cli) -> Self {
        Self { cli, env_file: PathBuf::from(".env") }
    }

    /// Read the env file from another location
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(&self.env_file)?;
        config.merge_from_env()?;
        self.cli.apply_to(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Lines of the env file that are malformed or hold invalid values.
    ///
    /// Values the real environment overrides are never applied, so these
    /// can be wrong without failing the run.
    pub fn env_file_warnings(&self) -> Result<Vec<String>> {
        Ok(EnvManager::check_env_file(&self.env_file)?.unwrap_or_default())
    }
}

/// Display configuration summary for verbose output
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Target: {}:{}", config.server_ip, config.server_port));
    summary.push(format!("Count: {}", config.count));
    summary.push(format!("Period: {} ms", config.period_ms));
    summary.push(format!("Timeout: {} ms", config.timeout_ms));
    summary.push(format!("Local Port: {}", if config.local_port == 0 { "any".to_string() } else { config.local_port.to_string() }));
    summary.push(format!("Strict Sequence: {}", config.strict_sequence));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("JSON Summary: {}", config.json));

    summary.join("\n")
}
