//! Configuration validation utilities and rules
//!
//! `Config::validate` rejects configurations that cannot run. The checks
//! here only produce warnings about configurations that will run but
//! probably not the way the user expects.

use crate::{
    error::Result,
    models::Config,
};
use std::net::IpAddr;

/// Upper bound for a timeout that still counts as "quick" loss detection
const LONG_TIMEOUT_MS: u64 = 60_000;

/// Expected run time above which the user is told up front
const LONG_RUN_MS: u64 = 3_600_000;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration with comprehensive checks
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_target(config));
        warnings.extend(Self::validate_timing(config));
        Ok(warnings)
    }

    fn validate_target(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let ip = config.server_ip.parse::<IpAddr>().ok();
        let is_local = config.server_ip.eq_ignore_ascii_case("localhost")
            || ip.map_or(false, |ip| ip.is_loopback());

        if is_local {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Target {} is on this host; RTTs will not reflect the network", config.server_ip),
            ));
            if config.local_port != 0 && config.local_port == config.server_port {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Local port {} is the server's port on the same host; binding will likely fail (use --local_port=0)", config.local_port),
                ));
            }
        }

        if ip.map_or(false, |ip| ip.is_unspecified() || ip.is_multicast()) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Target {} is not a unicast address", config.server_ip),
            ));
        }

        if config.local_port != 0 && config.local_port < 1024 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Local port {} is privileged and may require elevated permissions", config.local_port),
            ));
        }

        warnings
    }

    fn validate_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.count == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Count is 0; no probes will be sent".to_string(),
            ));
            return warnings;
        }

        if config.period_ms == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Period is 0; probes will be sent back-to-back".to_string(),
            ));
        }

        if config.period_ms > 0 && config.timeout_ms > config.period_ms {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Timeout ({} ms) exceeds period ({} ms); lost probes delay the next send",
                    config.timeout_ms, config.period_ms
                ),
            ));
        }

        if config.timeout_ms > LONG_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long timeout of {} ms will slow down loss detection", config.timeout_ms),
            ));
        }

        let worst_case_ms = u64::from(config.count).saturating_mul(config.period_ms.saturating_add(config.timeout_ms));
        if worst_case_ms > LONG_RUN_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Run may take up to {} s", worst_case_ms / 1000),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let level = match self.level {
                ValidationLevel::Info => self.level.as_str().blue(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", level, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server_ip: &str) -> Config {
        Config {
            server_ip: server_ip.to_string(),
            server_port: 9000,
            ..Config::default()
        }
    }

    fn messages(config: &Config) -> Vec<String> {
        validate_config(config).unwrap().into_iter().map(|w| w.message).collect()
    }

    #[test]
    fn test_validation_warning() {
        let warning = ValidationWarning::new(ValidationLevel::Warning, "Test warning message".to_string());
        assert_eq!(warning.format(false), "[WARNING] Test warning message");
        assert!(warning.format(true).contains("Test warning message"));
        assert!(ValidationLevel::Info < ValidationLevel::Warning);
    }

    #[test]
    fn test_remote_default_config_is_clean() {
        assert!(messages(&config("192.0.2.10")).is_empty());
    }

    #[test]
    fn test_hard_errors_propagate() {
        assert!(validate_config(&config("")).is_err());
        assert!(validate_config(&Config { timeout_ms: 0, ..config("h") }).is_err());
    }

    #[test]
    fn test_loopback_target() {
        let warnings = messages(&config("127.0.0.1"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("on this host"));

        let clash = Config { local_port: 9000, ..config("localhost") };
        let warnings = messages(&clash);
        assert!(warnings.iter().any(|m| m.contains("--local_port=0")));
    }

    #[test]
    fn test_ipv6_and_unicast_targets() {
        assert!(messages(&config("2001:db8::1")).is_empty());
        assert!(messages(&config("::1"))[0].contains("on this host"));
        assert!(messages(&config("224.0.0.1")).iter().any(|m| m.contains("not a unicast")));
        assert!(messages(&config("0.0.0.0")).iter().any(|m| m.contains("not a unicast")));
    }

    #[test]
    fn test_timing_warnings() {
        let zero = messages(&Config { count: 0, period_ms: 0, ..config("192.0.2.1") });
        assert_eq!(zero, vec!["Count is 0; no probes will be sent".to_string()]);

        let burst = messages(&Config { period_ms: 0, ..config("192.0.2.1") });
        assert!(burst[0].contains("back-to-back"));

        let slow = validate_config(&Config { count: 5_000, timeout_ms: 120_000, ..config("192.0.2.1") }).unwrap();
        assert!(slow.iter().any(|w| w.level == ValidationLevel::Info && w.message.contains("Long timeout")));
        assert!(slow.iter().any(|w| w.level == ValidationLevel::Warning && w.message.contains("Run may take")));

        let lagging = messages(&Config { period_ms: 200, timeout_ms: 500, ..config("192.0.2.1") });
        assert_eq!(lagging.len(), 1);
        assert!(lagging[0].contains("exceeds period"));
    }

    #[test]
    fn test_privileged_local_port() {
        let warnings = messages(&Config { local_port: 80, ..config("192.0.2.1") });
        assert!(warnings[0].contains("privileged"));
    }
}
