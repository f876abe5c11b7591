//! Colored formatter implementation with terminal color support
//!
//! Produces the same text as [`PlainFormatter`] with ANSI styling layered
//! on top; RTT values are tinted by how fast the reply came back.

use crate::{
    error::ProbeError,
    models::RunSummary,
};
use super::formatter::{OutputFormatter, PlainFormatter};
use colored::*;
use std::net::SocketAddr;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // >= 300ms
}

impl LatencyLevel {
    /// Determine latency level from an RTT in milliseconds
    pub fn from_rtt(rtt_ms: u64) -> Self {
        if rtt_ms < 50 {
            Self::Excellent
        } else if rtt_ms < 100 {
            Self::Good
        } else if rtt_ms < 300 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Get color for this latency level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
#[derive(Debug, Clone, Default)]
pub struct ColoredFormatter {
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with the default scheme
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(color_scheme: ColorScheme) -> Self {
        Self { color_scheme }
    }

    fn loss_color(&self, loss_percent: f64) -> Color {
        if loss_percent == 0.0 {
            self.color_scheme.success
        } else if loss_percent < 20.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_banner(&self, target: &str) -> String {
        format!("{} {}", "PING".bold(), target.bold().color(self.color_scheme.header))
    }

    fn format_reply(&self, from: SocketAddr, sequence: u64, rtt_ms: u64) -> String {
        let time = format!("time={} ms", rtt_ms);
        format!(
            "{} {}: seq={} {}",
            "PONG".color(self.color_scheme.success),
            from.ip(),
            sequence,
            time.color(LatencyLevel::from_rtt(rtt_ms).color())
        )
    }

    fn format_loss(&self, sequence: u64, reason: &ProbeError) -> String {
        PlainFormatter::new()
            .format_loss(sequence, reason)
            .color(self.color_scheme.error)
            .to_string()
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        let header = PlainFormatter::summary_header(summary)
            .bold()
            .color(self.color_scheme.header);
        let counts = PlainFormatter::summary_counts(summary).color(self.loss_color(summary.loss_percent));
        let rtt = if summary.total_received == 0 {
            PlainFormatter::summary_rtt(summary).color(self.color_scheme.muted)
        } else {
            PlainFormatter::summary_rtt(summary).normal()
        };
        format!("{}\n{}\n{}", header, counts, rtt)
    }
}
