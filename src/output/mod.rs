//! Output formatting and display system
//!
//! This module renders the per-probe lines and the final statistics block,
//! in either plain text or with terminal colors.

mod formatter;
mod colored;

pub use formatter::{OutputFormatter, PlainFormatter};
pub use colored::{ColoredFormatter, ColorScheme, LatencyLevel};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        if enable_color {
            Box::new(ColoredFormatter::new())
        } else {
            Box::new(PlainFormatter::new())
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false)
    }
}
