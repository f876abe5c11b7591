//! Error handling for the RTT probe client
//!
//! Two layers live here. [`AppError`] covers everything that can stop the
//! program before or around the probe loop (bad configuration, failing to
//! open the socket). [`ProbeError`] describes why a single probe was lost;
//! it never escapes the loop and is carried inside `Outcome::Lost`.

use std::time::Duration;
use thiserror::Error;

/// Custom error types for the RTT probe client
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network setup errors (socket bind, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (numbers, addresses, JSON)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Network(_) => "NETWORK",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error was raised before the probe loop could start
    /// because of what the user supplied
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_) | Self::Parse(_))
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the server address, port and timing values.", msg)
            }
            Self::Network(msg) => {
                format!("Network setup failed: {}\n\nSuggestion: The local port may already be in use; try --local_port=0.", msg)
            }
            Self::Io(msg) => {
                format!("I/O operation failed: {}", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse value: {}\n\nSuggestion: Numeric options take plain integers, e.g. --count=5.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) => 2,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Why a single probe produced no usable reply.
///
/// Every variant is local to one sequence number; the scheduler turns it
/// into `Outcome::Lost` and moves on to the next probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("cannot resolve {target}: {reason}")]
    Resolve { target: String, reason: String },

    #[error("send failed: {0}")]
    Send(String),

    #[error("Receive timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("receive failed: {0}")]
    Receive(String),

    /// Only raised when strict sequence matching is enabled
    #[error("unexpected reply for seq={expected}: {line:?}")]
    MalformedReply { expected: u64, line: String },
}

impl ProbeError {
    /// Classify a receive-side I/O error. Platforms disagree on which kind a
    /// socket read timeout surfaces as, so both are mapped to `Timeout`.
    pub fn from_recv(error: &std::io::Error, timeout: Duration) -> Self {
        match error.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Self::Timeout(timeout),
            _ => Self::Receive(error.to_string()),
        }
    }

    /// Short machine-friendly label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "resolve",
            Self::Send(_) => "send",
            Self::Timeout(_) => "timeout",
            Self::Receive(_) => "receive",
            Self::MalformedReply { .. } => "malformed_reply",
        }
    }
}

/// Error reporter for user feedback on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render the report for an error without printing it
    pub fn render(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);
        if self.verbose {
            out.push_str("\n\n");
            out.push_str(&error.user_friendly_message());
        }
        out
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid configuration");
        assert_eq!(config_error.category(), "CONFIG");
        assert!(config_error.is_usage_error());
        assert_eq!(config_error.exit_code(), 1);

        let network_error = AppError::network("bind failed");
        assert_eq!(network_error.category(), "NETWORK");
        assert!(!network_error.is_usage_error());
        assert_eq!(network_error.exit_code(), 2);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::config("Test configuration error");
        let display = error.to_string();
        assert!(display.contains("Configuration error"));
        assert!(display.contains("Test configuration error"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::validation("validation"),
            AppError::network("network"),
            AppError::io("io"),
            AppError::parse("parse"),
            AppError::internal("internal"),
        ];
        let expected = ["CONFIG", "VALIDATION", "NETWORK", "IO", "PARSE", "INTERNAL"];

        for (error, expected) in errors.iter().zip(expected.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_error_conversions() {
        let io_error: AppError = io::Error::new(io::ErrorKind::AddrInUse, "in use").into();
        assert!(matches!(io_error, AppError::Io(_)));

        let int_error: AppError = "abc".parse::<u32>().unwrap_err().into();
        assert!(matches!(int_error, AppError::Parse(_)));
        assert!(int_error.to_string().contains("Integer parse error"));

        let bool_error: AppError = "maybe".parse::<bool>().unwrap_err().into();
        assert!(matches!(bool_error, AppError::Parse(_)));

        let addr_error: AppError = "not-an-ip".parse::<std::net::IpAddr>().unwrap_err().into();
        assert!(addr_error.to_string().contains("IP address parse error"));
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::validation("server port must be non-zero");
        let plain = error.format_for_console(false);
        assert_eq!(plain, "[VALIDATION] Validation error: server port must be non-zero");

        let colored = error.format_for_console(true);
        assert!(colored.contains("server port must be non-zero"));
        assert!(colored.contains("VALIDATION"));
    }

    #[test]
    fn test_reporter_verbose_adds_suggestion() {
        let reporter = ErrorReporter::new(false, true);
        let rendered = reporter.render(&AppError::network("Address already in use"));
        assert!(rendered.starts_with("[NETWORK]"));
        assert!(rendered.contains("--local_port=0"));

        let terse = ErrorReporter::new(false, false).render(&AppError::network("x"));
        assert!(!terse.contains("Suggestion"));
    }

    #[test]
    fn test_probe_error_timeout_classification() {
        let timeout = Duration::from_millis(250);
        for kind in [io::ErrorKind::WouldBlock, io::ErrorKind::TimedOut] {
            let err = io::Error::new(kind, "timed out");
            assert_eq!(ProbeError::from_recv(&err, timeout), ProbeError::Timeout(timeout));
        }

        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let classified = ProbeError::from_recv(&refused, timeout);
        assert_eq!(classified.kind(), "receive");
        assert!(classified.to_string().contains("refused"));
    }

    #[test]
    fn test_probe_error_messages() {
        assert_eq!(
            ProbeError::Timeout(Duration::from_millis(1000)).to_string(),
            "Receive timed out after 1000 ms"
        );
        let malformed = ProbeError::MalformedReply { expected: 3, line: "PING 2 99".to_string() };
        assert_eq!(malformed.kind(), "malformed_reply");
        assert!(malformed.to_string().contains("seq=3"));
        assert!(malformed.to_string().contains("PING 2 99"));
    }
}
