//! End-of-run summary

use serde::{Deserialize, Serialize};

/// Aggregate statistics for one run, built once after the last probe
/// resolves.
///
/// When nothing was received, `rtt_min`, `rtt_avg` and `rtt_max` are all 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Target as the user supplied it
    pub target: String,
    /// Transmission attempts
    pub total_sent: u64,
    /// Replies counted as received
    pub total_received: u64,
    /// Loss rounded half-up to one decimal place
    pub loss_percent: f64,
    pub rtt_min: u64,
    pub rtt_avg: u64,
    pub rtt_max: u64,
    /// Milliseconds from the first send to the resolution of the last probe
    pub total_elapsed_ms: u64,
}

impl RunSummary {
    /// Summary of a run that sent nothing
    pub fn empty(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            total_sent: 0,
            total_received: 0,
            loss_percent: 0.0,
            rtt_min: 0,
            rtt_avg: 0,
            rtt_max: 0,
            total_elapsed_ms: 0,
        }
    }

    pub fn total_lost(&self) -> u64 {
        self.total_sent.saturating_sub(self.total_received)
    }

    /// Loss percentage as displayed, always with one decimal (`66.7`, `100.0`)
    pub fn loss_display(&self) -> String {
        format!("{:.1}", self.loss_percent)
    }
}
