//! Command-line interface
//!
//! Every option is optional at this layer so that values from the `.env`
//! file and the environment survive unless a flag overrides them. Missing
//! required values are reported by config validation, not by clap.

use crate::models::Config;
use clap::Parser;

const AFTER_HELP: &str = "\
Examples:
  rtt-probe --server_ip=192.168.0.10 --server_port=5021
  rtt-probe --server_ip=echo.local --server_port=7 --count=10 --period=500 --timeout=2000
  rtt-probe --server_ip=127.0.0.1 --server_port=9000 --local_port=0 --json

Environment:
  PING_SERVER_IP, PING_SERVER_PORT, PING_COUNT, PING_PERIOD_MS,
  PING_TIMEOUT_MS, PING_LOCAL_PORT and ENABLE_COLOR are read from the
  environment or a .env file in the working directory. Flags win.";

/// RTT probe - measure round-trip time and loss against a UDP echo server
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rtt-probe")]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Host name or IP address of the echo server
    #[arg(long = "server_ip", value_name = "HOST")]
    pub server_ip: Option<String>,

    /// UDP port of the echo server
    #[arg(long = "server_port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Number of probes to send [default: 4]
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Pause before each probe, in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    pub period: Option<u64>,

    /// How long to wait for each reply, in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Local UDP port to bind, 0 for any free port [default: 5005]
    #[arg(long = "local_port", value_name = "PORT")]
    pub local_port: Option<u16>,

    /// Only count replies that echo the probe's sequence number
    #[arg(long)]
    pub strict: bool,

    /// Print the final statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Override `config` with every flag that was given
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(server_ip) = &self.server_ip {
            config.server_ip = server_ip.trim().to_string();
        }
        if let Some(server_port) = self.server_port {
            config.server_port = server_port;
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(period) = self.period {
            config.period_ms = period;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(local_port) = self.local_port {
            config.local_port = local_port;
        }

        config.strict_sequence |= self.strict;
        config.json |= self.json;
        config.verbose |= self.verbose;
        config.debug |= self.debug;
        config.enable_color = config.enable_color && self.use_colors();
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

/// One-line usage summary printed with configuration errors
pub fn usage() -> &'static str {
    "Usage: rtt-probe --server_ip=<host> --server_port=<port> [--count=<n>] [--period=<ms>] [--timeout=<ms>] [--local_port=<port>] [--strict] [--json] [--no-color] [--verbose] [--debug]"
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    color_from_env(
        std::env::var("TERM").ok().as_deref(),
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var_os("FORCE_COLOR").is_some(),
    )
}

fn color_from_env(term: Option<&str>, no_color: bool, force_color: bool) -> bool {
    if no_color {
        return false;
    }
    if force_color {
        return true;
    }
    if term == Some("dumb") {
        return false;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
