//! Main application orchestration and execution

use crate::{
    config::{display_config_summary, validate_config, ValidationWarning},
    error::Result,
    executor::{Clock, ProbeScheduler, ScheduleConfig, SystemClock},
    logging::{Logger, LoggerFactory},
    models::{Config, RunSummary},
    output::OutputFormatterFactory,
    stats::StatsAggregator,
    transport::{Transport, UdpTransport},
};
use std::io::{self, Write};

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    warnings: Vec<ValidationWarning>,
    env_file_warnings: Vec<String>,
    loggers: LoggerFactory,
}

impl App {
    /// Create a new application instance from a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let warnings = validate_config(&config)?;
        let loggers = LoggerFactory::new(config.clone());
        Ok(Self { config, warnings, env_file_warnings: Vec::new(), loggers })
    }

    /// Attach problems found in the env file, shown when verbose
    pub fn with_env_file_warnings(mut self, warnings: Vec<String>) -> Self {
        self.env_file_warnings = warnings;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Open the UDP socket and run against stdout
    pub fn run(&self) -> Result<RunSummary> {
        let logger = self.loggers.create_logger("APP");
        let transport = UdpTransport::bind_for_target(&self.config.server_ip, self.config.server_port, self.config.local_port)
            .inspect_err(|e| logger.error("Socket setup failed").error_info(e).log())?;

        if let Ok(local) = transport.local_addr() {
            logger.info("UDP socket bound").field("local_addr", local.to_string()).log();
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(transport, SystemClock, &mut out)
    }

    /// Run with an explicit transport, clock and report sink
    pub fn run_with<T, C>(&self, transport: T, clock: C, out: &mut dyn Write) -> Result<RunSummary>
    where
        T: Transport,
        C: Clock,
    {
        let logger = self.loggers.create_logger("APP");
        self.report_setup(&logger);

        let probe_logger = self.loggers.create_probe_logger();
        probe_logger.log_run_start(&self.config);

        let formatter = OutputFormatterFactory::create_formatter(self.config.enable_color);
        let mut scheduler = ProbeScheduler::with_clock(
            transport,
            clock,
            ScheduleConfig::from(&self.config),
            formatter,
            probe_logger,
        );

        let mut stats = StatsAggregator::new();
        let record = scheduler.run(&mut stats, out);
        let summary = stats.finish(&self.config.server_ip, record.run_start, record.run_end);

        self.loggers.create_probe_logger().log_run_complete(&summary);
        self.write_summary(&summary, out)?;
        Ok(summary)
    }

    fn report_setup(&self, logger: &Logger) {
        logger.debug("Configuration loaded")
            .field("session_id", self.loggers.session_id())
            .log();

        if self.config.verbose {
            eprintln!("{}", display_config_summary(&self.config));
            for warning in &self.warnings {
                eprintln!("  {}", warning.format(self.config.enable_color));
            }
            for warning in &self.env_file_warnings {
                eprintln!("  .env: {}", warning);
            }
        }
    }

    fn write_summary(&self, summary: &RunSummary, out: &mut dyn Write) -> Result<()> {
        let formatter = OutputFormatterFactory::create_formatter(self.config.enable_color);
        let text = if self.config.json {
            formatter.format_summary_json(summary)?
        } else {
            formatter.format_summary(summary)
        };

        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }
}
