//! Data models and structures for the RTT probe client

pub mod config;
pub mod probe;
pub mod summary;

// Re-export main model types
pub use config::Config;
pub use probe::{EchoReply, Outcome, Probe, MAX_REPLY_SIZE};
pub use summary::RunSummary;
