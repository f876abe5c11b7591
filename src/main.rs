//! RTT Probe - Main CLI Application
//!
//! Sends sequenced UDP probes to an echo server and prints per-probe
//! round-trip times followed by loss and latency statistics.

use clap::Parser;
use rtt_probe::{
    app::App,
    build_info,
    cli::{usage, Cli},
    config::ConfigParser,
    error::{AppError, ErrorReporter, Result},
    PKG_NAME, VERSION,
};
use std::process;

fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("This is a bug; please report it with the command line you used.");
        process::exit(99);
    }));

    // Unknown or malformed flags exit here with clap's usage message
    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli) {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{} {}", PKG_NAME, VERSION, build_info::describe());
    }

    let parser = ConfigParser::new(cli);
    let config = parser.parse()?;
    let env_file_warnings = if config.verbose { parser.env_file_warnings()? } else { Vec::new() };
    let app = App::new(config)?.with_env_file_warnings(env_file_warnings);
    app.run()?;
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    if error.is_usage_error() {
        eprintln!("{}", usage());
        return;
    }

    if let AppError::Network(_) = error {
        eprintln!();
        eprintln!("Network troubleshooting:");
        eprintln!("  - Another process may hold the local port; try --local_port=0");
        eprintln!("  - Ports below 1024 need elevated permissions");
    }
}
