//! Core formatting trait and the plain text implementation
//!
//! Every line the client prints on stdout is produced here, so the exact
//! report format is defined in one place.

use crate::{
    error::{ProbeError, Result},
    models::RunSummary,
};
use std::net::SocketAddr;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Banner printed once, on the first transmission attempt
    fn format_banner(&self, target: &str) -> String;

    /// Line for a probe that got a reply
    fn format_reply(&self, from: SocketAddr, sequence: u64, rtt_ms: u64) -> String;

    /// Line for a probe that was lost
    fn format_loss(&self, sequence: u64, reason: &ProbeError) -> String;

    /// Final statistics block (three lines, no trailing newline)
    fn format_summary(&self, summary: &RunSummary) -> String;

    /// Final statistics as a single JSON document
    fn format_summary_json(&self, summary: &RunSummary) -> Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }
}

/// Plain text formatter implementation
#[derive(Debug, Clone, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    /// Create a new plain formatter
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn summary_header(summary: &RunSummary) -> String {
        format!("--- {} ping statistics ---", summary.target)
    }

    pub(crate) fn summary_counts(summary: &RunSummary) -> String {
        format!(
            "{} transmitted, {} received, {}% loss, time {} ms",
            summary.total_sent,
            summary.total_received,
            summary.loss_display(),
            summary.total_elapsed_ms
        )
    }

    pub(crate) fn summary_rtt(summary: &RunSummary) -> String {
        format!(
            "rtt min/avg/max = {}/{}/{} ms",
            summary.rtt_min, summary.rtt_avg, summary.rtt_max
        )
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_banner(&self, target: &str) -> String {
        format!("PING {}", target)
    }

    fn format_reply(&self, from: SocketAddr, sequence: u64, rtt_ms: u64) -> String {
        format!("PONG {}: seq={} time={} ms", from.ip(), sequence, rtt_ms)
    }

    fn format_loss(&self, _sequence: u64, reason: &ProbeError) -> String {
        format!("Error processing ping response: {}", reason)
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        [
            Self::summary_header(summary),
            Self::summary_counts(summary),
            Self::summary_rtt(summary),
        ]
        .join("\n")
    }
}
