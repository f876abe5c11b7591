//! RTT Probe
//!
//! A UDP round-trip-time client: sends a fixed number of sequenced text
//! probes to an echo server, one at a time, and reports per-probe RTT plus
//! loss and min/avg/max statistics for the run.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod transport;

// Re-export commonly used types
pub use app::App;
pub use error::{AppError, ProbeError, Result};
pub use executor::{Clock, ProbeScheduler, RunRecord, ScheduleConfig, SystemClock};
pub use models::{Config, EchoReply, Outcome, Probe, RunSummary};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use stats::StatsAggregator;
pub use transport::{Transport, UdpTransport};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata injected by build.rs
pub mod build_info {
    pub const BUILD_TIME: &str = env!("BUILD_TIME");
    pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
    pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

    /// One-line description for debug output
    pub fn describe() -> String {
        format!(
            "built {} for {}{}",
            BUILD_TIME,
            TARGET_TRIPLE,
            GIT_COMMIT.map(|c| format!(" ({})", c)).unwrap_or_default()
        )
    }
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_COUNT: u32 = 4;
    pub const DEFAULT_PERIOD_MS: u64 = 1_000;
    pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;
    /// The client binds a fixed port unless told otherwise
    pub const DEFAULT_LOCAL_PORT: u16 = 5005;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
