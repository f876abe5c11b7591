//! Statistics aggregation for a probe run
//!
//! [`StatsAggregator`] folds the stream of per-probe outcomes into a
//! [`RunSummary`]. It is owned by the caller and lent to the scheduler by
//! `&mut`, so there is no shared state between the two.

use crate::models::{Outcome, RunSummary};

/// Running totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsAggregator {
    sent: u64,
    received: u64,
    rtt_sum: u64,
    rtt_min: Option<u64>,
    rtt_max: Option<u64>,
}

impl StatsAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a transmission attempt. Called before the send result is
    /// known, so a probe whose send fails is still counted as sent.
    pub fn record_attempt(&mut self) {
        self.sent += 1;
    }

    /// Fold one outcome into the totals. Losses carry no RTT and only
    /// show up through `sent - received`.
    pub fn record(&mut self, outcome: &Outcome) {
        if let Outcome::Received { rtt_ms, .. } = outcome {
            self.received += 1;
            self.rtt_sum = self.rtt_sum.saturating_add(*rtt_ms);
            self.rtt_min = Some(self.rtt_min.map_or(*rtt_ms, |m| m.min(*rtt_ms)));
            self.rtt_max = Some(self.rtt_max.map_or(*rtt_ms, |m| m.max(*rtt_ms)));
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Truncating mean of received RTTs, 0 when nothing was received
    pub fn rtt_avg(&self) -> u64 {
        if self.received == 0 {
            0
        } else {
            self.rtt_sum / self.received
        }
    }

    /// Build the final summary. `run_start`/`run_end` are epoch
    /// milliseconds; either being absent (no probe ran) yields 0 elapsed.
    pub fn finish(&self, target: &str, run_start: Option<i64>, run_end: Option<i64>) -> RunSummary {
        let total_elapsed_ms = match (run_start, run_end) {
            (Some(start), Some(end)) => u64::try_from(end.saturating_sub(start)).unwrap_or(0),
            _ => 0,
        };

        RunSummary {
            target: target.to_string(),
            total_sent: self.sent,
            total_received: self.received,
            loss_percent: loss_percent(self.sent, self.received),
            rtt_min: self.rtt_min.unwrap_or(0),
            rtt_avg: self.rtt_avg(),
            rtt_max: self.rtt_max.unwrap_or(0),
            total_elapsed_ms,
        }
    }
}

/// Loss in tenths of a percent, rounded half-up.
///
/// Computed in integers so a ratio like 2/3 lands on 667 rather than
/// drifting with float error: `round(1000 * lost / sent)` is
/// `(2000 * lost + sent) / (2 * sent)`.
pub fn loss_tenths(sent: u64, received: u64) -> u64 {
    if sent == 0 {
        return 0;
    }
    let lost = sent.saturating_sub(received) as u128;
    let sent = sent as u128;
    ((2000 * lost + sent) / (2 * sent)) as u64
}

/// Loss percentage rounded half-up to one decimal place; 0.0 when nothing
/// was sent.
pub fn loss_percent(sent: u64, received: u64) -> f64 {
    loss_tenths(sent, received) as f64 / 10.0
}
