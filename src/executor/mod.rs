//! Probe execution engine
//!
//! [`ProbeScheduler`] drives a run: exactly `count` probes, each preceded by
//! the configured pause and each fully resolved (reply or loss) before the
//! next one starts. Per-probe failures become [`Outcome::Lost`] and never
//! stop the loop.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::{
    error::ProbeError,
    logging::ProbeLogger,
    models::{Config, EchoReply, Outcome, Probe, MAX_REPLY_SIZE},
    output::OutputFormatter,
    stats::StatsAggregator,
    transport::Transport,
};
use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

/// Scheduling parameters for one run, taken from the validated [`Config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Target host as the user supplied it; also used in the banner
    pub target_host: String,
    pub target_port: u16,
    pub count: u32,
    pub period: Duration,
    pub timeout: Duration,
    /// Reject replies that do not echo the probe's sequence number
    pub strict_sequence: bool,
}

impl From<&Config> for ScheduleConfig {
    fn from(config: &Config) -> Self {
        Self {
            target_host: config.server_ip.clone(),
            target_port: config.server_port,
            count: config.count,
            period: config.period(),
            timeout: config.timeout(),
            strict_sequence: config.strict_sequence,
        }
    }
}

/// Timing of a finished run.
///
/// Both instants are epoch milliseconds and stay `None` when `count` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunRecord {
    /// Probes attempted
    pub probes: u64,
    /// Send time of the first probe
    pub run_start: Option<i64>,
    /// Instant the last probe resolved
    pub run_end: Option<i64>,
}

/// Sequential probe loop over a [`Transport`]
pub struct ProbeScheduler<T: Transport, C: Clock = SystemClock> {
    transport: T,
    clock: C,
    config: ScheduleConfig,
    formatter: Box<dyn OutputFormatter>,
    logger: ProbeLogger,
    /// Last successful resolution of the target
    target: Option<SocketAddr>,
}

impl<T: Transport> ProbeScheduler<T, SystemClock> {
    /// Create a new scheduler on the system clock
    pub fn new(transport: T, config: ScheduleConfig, formatter: Box<dyn OutputFormatter>, logger: ProbeLogger) -> Self {
        Self::with_clock(transport, SystemClock, config, formatter, logger)
    }
}

impl<T: Transport, C: Clock> ProbeScheduler<T, C> {
    /// Create a new scheduler with an explicit time source
    pub fn with_clock(
        transport: T,
        clock: C,
        config: ScheduleConfig,
        formatter: Box<dyn OutputFormatter>,
        logger: ProbeLogger,
    ) -> Self {
        Self { transport, clock, config, formatter, logger, target: None }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Give the transport back, e.g. to reuse the socket
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run all probes, folding each outcome into `stats` and writing one
    /// report line per probe (plus the banner) to `out`.
    pub fn run(&mut self, stats: &mut StatsAggregator, out: &mut dyn Write) -> RunRecord {
        let mut record = RunRecord::default();
        let count = u64::from(self.config.count);

        for sequence in 0..count {
            self.clock.sleep(self.config.period);

            let sent_at = self.clock.now_ms();
            if sequence == 0 {
                record.run_start = Some(sent_at);
                let banner = self.formatter.format_banner(&self.config.target_host);
                self.emit(out, &banner);
            }

            stats.record_attempt();
            record.probes += 1;
            let outcome = self.probe_once(Probe::new(sequence, sent_at));

            if sequence + 1 == count {
                record.run_end = Some(self.clock.now_ms());
            }

            let line = match &outcome {
                Outcome::Received { sequence, rtt_ms, from } => self.formatter.format_reply(*from, *sequence, *rtt_ms),
                Outcome::Lost { sequence, reason } => {
                    self.logger.log_loss(*sequence, reason);
                    self.formatter.format_loss(*sequence, reason)
                }
            };
            self.emit(out, &line);
            stats.record(&outcome);
        }

        record
    }

    /// Send one probe and wait for its reply
    pub fn probe_once(&mut self, probe: Probe) -> Outcome {
        let sequence = probe.sequence;
        let lost = |reason: ProbeError| Outcome::Lost { sequence, reason };

        let target = match self.resolve_target() {
            Ok(target) => target,
            Err(reason) => return lost(reason),
        };

        if let Err(e) = self.transport.send_to(&probe.encode(), target) {
            return lost(ProbeError::Send(e.to_string()));
        }
        self.logger.log_probe_sent(&probe, target);

        let mut buf = [0u8; MAX_REPLY_SIZE];
        let waiting_since = self.clock.now_ms();
        // first line of the last reply strict mode threw away
        let mut stale: Option<String> = None;
        let unmatched = |stale: Option<String>, timed_out: ProbeError| match stale {
            Some(line) => ProbeError::MalformedReply { expected: sequence, line },
            None => timed_out,
        };

        loop {
            let remaining = self.remaining_wait(waiting_since);
            if remaining.is_zero() {
                return lost(unmatched(stale, ProbeError::Timeout(self.config.timeout)));
            }

            let (len, from) = match self.transport.recv_from(&mut buf, remaining) {
                Ok(received) => received,
                Err(e) => {
                    let reason = ProbeError::from_recv(&e, self.config.timeout);
                    return match reason {
                        ProbeError::Timeout(_) => lost(unmatched(stale, reason)),
                        _ => lost(reason),
                    };
                }
            };
            // A backwards clock step reads as 0 rather than wrapping
            let rtt_ms = u64::try_from(self.clock.now_ms().saturating_sub(probe.sent_at)).unwrap_or(0);

            let reply = EchoReply::parse(&buf[..len], from);
            if self.config.strict_sequence && reply.echoed_sequence() != Some(sequence) {
                // a late answer to an earlier probe; keep waiting for ours
                self.logger.log_stale_reply(sequence, reply.from, &reply.first_line);
                stale = Some(reply.first_line);
                continue;
            }

            self.logger.log_reply(sequence, rtt_ms, from, &reply.first_line);
            return Outcome::Received { sequence, rtt_ms, from: reply.from };
        }
    }

    /// Look the target up until it resolves once, then reuse the address
    /// so name lookups stay out of the measured RTT
    fn resolve_target(&mut self) -> Result<SocketAddr, ProbeError> {
        if let Some(target) = self.target {
            return Ok(target);
        }
        let target = self.transport.resolve(&self.config.target_host, self.config.target_port)?;
        self.target = Some(target);
        Ok(target)
    }

    /// Time left of the reply window opened at `since`
    fn remaining_wait(&self, since: i64) -> Duration {
        let elapsed = u64::try_from(self.clock.now_ms().saturating_sub(since)).unwrap_or(0);
        self.config.timeout.saturating_sub(Duration::from_millis(elapsed))
    }

    fn emit(&self, out: &mut dyn Write, line: &str) {
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            self.logger.log_output_failure(&e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PlainFormatter;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::io;

    const SERVER: &str = "127.0.0.1:7000";

    /// What the scripted transport does on the next receive
    enum Reply {
        /// Answer after `delay_ms` with `payload`
        After(i64, &'static [u8]),
        /// Wait out the whole timeout
        Silence,
        Fail(io::ErrorKind),
    }

    struct ScriptedTransport {
        clock: ManualClock,
        replies: VecDeque<Reply>,
        fail_sends: VecDeque<bool>,
        unresolvable: Cell<u32>,
        lookups: Cell<u32>,
        sent: Vec<(Vec<u8>, SocketAddr)>,
    }

    impl ScriptedTransport {
        fn new(clock: &ManualClock, replies: Vec<Reply>) -> Self {
            Self {
                clock: clock.clone(),
                replies: replies.into(),
                fail_sends: VecDeque::new(),
                unresolvable: Cell::new(0),
                lookups: Cell::new(0),
                sent: Vec::new(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> io::Result<usize> {
            if self.fail_sends.pop_front().unwrap_or(false) {
                return Err(io::Error::new(io::ErrorKind::NetworkUnreachable, "network unreachable"));
            }
            self.sent.push((payload.to_vec(), target));
            Ok(payload.len())
        }

        fn recv_from(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<(usize, SocketAddr)> {
            match self.replies.pop_front().unwrap_or(Reply::Silence) {
                Reply::After(delay, payload) => {
                    self.clock.advance(delay);
                    buf[..payload.len()].copy_from_slice(payload);
                    Ok((payload.len(), SERVER.parse().unwrap()))
                }
                Reply::Silence => {
                    self.clock.advance(timeout.as_millis() as i64);
                    Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"))
                }
                Reply::Fail(kind) => Err(io::Error::new(kind, "receive failed")),
            }
        }

        fn resolve(&self, host: &str, port: u16) -> Result<SocketAddr, ProbeError> {
            self.lookups.set(self.lookups.get() + 1);
            if self.unresolvable.get() > 0 {
                self.unresolvable.set(self.unresolvable.get() - 1);
                Err(ProbeError::Resolve { target: host.to_string(), reason: "no such host".to_string() })
            } else {
                Ok(SocketAddr::from(([127, 0, 0, 1], port)))
            }
        }
    }

    fn schedule(count: u32) -> ScheduleConfig {
        ScheduleConfig {
            target_host: "127.0.0.1".to_string(),
            target_port: 7000,
            count,
            period: Duration::from_millis(1000),
            timeout: Duration::from_millis(500),
            strict_sequence: false,
        }
    }

    fn scheduler(transport: ScriptedTransport, clock: &ManualClock, config: ScheduleConfig) -> ProbeScheduler<ScriptedTransport, ManualClock> {
        ProbeScheduler::with_clock(transport, clock.clone(), config, Box::new(PlainFormatter::new()), ProbeLogger::quiet())
    }

    fn run(scheduler: &mut ProbeScheduler<ScriptedTransport, ManualClock>) -> (StatsAggregator, RunRecord, Vec<String>) {
        let mut stats = StatsAggregator::new();
        let mut out = Vec::new();
        let record = scheduler.run(&mut stats, &mut out);
        let lines = String::from_utf8(out).unwrap().lines().map(str::to_string).collect();
        (stats, record, lines)
    }

    #[test]
    fn test_all_replies_received() {
        let clock = ManualClock::new(1_000_000);
        let transport = ScriptedTransport::new(&clock, vec![
            Reply::After(10, b"PING 0 x\n"),
            Reply::After(20, b"PING 1 x\n"),
            Reply::After(30, b"PING 2 x\n"),
        ]);
        let mut scheduler = scheduler(transport, &clock, schedule(3));
        let (stats, record, lines) = run(&mut scheduler);

        assert_eq!(lines, vec![
            "PING 127.0.0.1",
            "PONG 127.0.0.1: seq=0 time=10 ms",
            "PONG 127.0.0.1: seq=1 time=20 ms",
            "PONG 127.0.0.1: seq=2 time=30 ms",
        ]);

        // first send after one period; three periods and 60 ms of RTT in total
        assert_eq!(record.run_start, Some(1_001_000));
        assert_eq!(record.run_end, Some(1_001_000 + 2 * 1000 + 60));
        assert_eq!(record.probes, 3);

        let summary = stats.finish("127.0.0.1", record.run_start, record.run_end);
        assert_eq!((summary.rtt_min, summary.rtt_avg, summary.rtt_max), (10, 20, 30));
        assert_eq!(summary.loss_percent, 0.0);
        assert_eq!(summary.total_elapsed_ms, 2060);
    }

    #[test]
    fn test_sequences_are_contiguous_and_wire_format_exact() {
        let clock = ManualClock::new(500);
        let transport = ScriptedTransport::new(&clock, vec![]);
        let mut scheduler = scheduler(transport, &clock, ScheduleConfig { period: Duration::ZERO, ..schedule(4) });
        let (stats, _, _) = run(&mut scheduler);
        assert_eq!(stats.sent(), 4);

        let transport = scheduler.into_transport();
        let payloads: Vec<String> = transport.sent.iter()
            .map(|(p, _)| String::from_utf8(p.clone()).unwrap())
            .collect();
        // each silent probe advances the clock by the 500 ms timeout
        assert_eq!(payloads, vec![
            "PING 0 500\n",
            "PING 1 1000\n",
            "PING 2 1500\n",
            "PING 3 2000\n",
        ]);
        assert!(transport.sent.iter().all(|(_, to)| to.port() == 7000));
    }

    #[test]
    fn test_zero_count_sends_nothing() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![]);
        let mut scheduler = scheduler(transport, &clock, schedule(0));
        let (stats, record, lines) = run(&mut scheduler);

        assert!(lines.is_empty());
        assert_eq!(record, RunRecord::default());
        assert_eq!(stats.finish("127.0.0.1", record.run_start, record.run_end), crate::models::RunSummary::empty("127.0.0.1"));
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_timeouts_are_lost_and_loop_continues() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![
            Reply::Silence,
            Reply::After(12, b"PONG"),
            Reply::Silence,
        ]);
        let mut scheduler = scheduler(transport, &clock, schedule(3));
        let (stats, record, lines) = run(&mut scheduler);

        assert_eq!(lines, vec![
            "PING 127.0.0.1",
            "Error processing ping response: Receive timed out after 500 ms",
            "PONG 127.0.0.1: seq=1 time=12 ms",
            "Error processing ping response: Receive timed out after 500 ms",
        ]);

        let summary = stats.finish("127.0.0.1", record.run_start, record.run_end);
        assert_eq!(summary.total_sent, 3);
        assert_eq!(summary.total_received, 1);
        assert_eq!(summary.loss_display(), "66.7");
        assert_eq!((summary.rtt_min, summary.rtt_avg, summary.rtt_max), (12, 12, 12));
        // run_end is taken after the final timeout resolves
        assert_eq!(summary.total_elapsed_ms, 500 + 1000 + 12 + 1000 + 500);
    }

    #[test]
    fn test_failed_send_still_counts_as_sent() {
        let clock = ManualClock::new(0);
        let mut transport = ScriptedTransport::new(&clock, vec![Reply::After(5, b"PING 1 0\n")]);
        transport.fail_sends = vec![true, false].into();
        let mut scheduler = scheduler(transport, &clock, schedule(2));
        let (stats, record, lines) = run(&mut scheduler);

        assert_eq!(lines[0], "PING 127.0.0.1");
        assert!(lines[1].starts_with("Error processing ping response: send failed"));
        assert_eq!(lines[2], "PONG 127.0.0.1: seq=1 time=5 ms");
        assert_eq!(stats.sent(), 2);
        assert_eq!(stats.received(), 1);
        assert!(record.run_end.is_some());
    }

    #[test]
    fn test_unresolvable_target_loses_every_probe() {
        let clock = ManualClock::new(0);
        let mut transport = ScriptedTransport::new(&clock, vec![]);
        transport.unresolvable = Cell::new(u32::MAX);
        let mut scheduler = scheduler(transport, &clock, schedule(2));
        let (stats, record, lines) = run(&mut scheduler);

        // banner still printed on the first attempt
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "PING 127.0.0.1");
        assert!(lines[1].contains("cannot resolve 127.0.0.1: no such host"));
        assert_eq!(stats.sent(), 2);
        assert_eq!(stats.finish("x", record.run_start, record.run_end).loss_percent, 100.0);
        assert!(scheduler.into_transport().sent.is_empty());
    }

    #[test]
    fn test_target_is_looked_up_until_it_resolves_once() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![
            Reply::After(1, b"PING 1 0\n"),
            Reply::After(1, b"PING 2 0\n"),
            Reply::After(1, b"PING 3 0\n"),
        ]);
        transport.unresolvable.set(1);
        let mut scheduler = scheduler(transport, &clock, schedule(4));
        let (stats, _, lines) = run(&mut scheduler);

        assert!(lines[1].contains("cannot resolve"));
        assert_eq!(stats.received(), 3);
        let transport = scheduler.into_transport();
        assert_eq!(transport.lookups.get(), 2);
        assert_eq!(transport.sent.len(), 3);
    }

    #[test]
    fn test_receive_error_is_lost() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![Reply::Fail(io::ErrorKind::ConnectionRefused)]);
        let mut scheduler = scheduler(transport, &clock, schedule(1));
        let (stats, _, lines) = run(&mut scheduler);

        assert_eq!(lines[1], "Error processing ping response: receive failed: receive failed");
        assert_eq!(stats.received(), 0);
    }

    #[test]
    fn test_any_reply_counts_by_default() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![Reply::After(3, b"\xff\xfegarbage")]);
        let mut scheduler = scheduler(transport, &clock, schedule(1));
        let (stats, _, lines) = run(&mut scheduler);

        assert_eq!(lines[1], "PONG 127.0.0.1: seq=0 time=3 ms");
        assert_eq!(stats.received(), 1);
    }

    #[test]
    fn test_strict_mode_rejects_mismatched_echo() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![
            Reply::After(4, b"PING 0 0\n"),
            Reply::After(4, b"PING 0 0\n"),
        ]);
        let config = ScheduleConfig { strict_sequence: true, ..schedule(2) };
        let mut scheduler = scheduler(transport, &clock, config);
        let (stats, _, lines) = run(&mut scheduler);

        assert_eq!(lines[1], "PONG 127.0.0.1: seq=0 time=4 ms");
        assert_eq!(lines[2], "Error processing ping response: unexpected reply for seq=1: \"PING 0 0\"");
        assert_eq!(stats.sent(), 2);
        assert_eq!(stats.received(), 1);
    }

    #[test]
    fn test_strict_mode_skips_late_reply_and_keeps_waiting() {
        let clock = ManualClock::new(0);
        // seq 0 times out, its answer shows up during seq 1's window
        let transport = ScriptedTransport::new(&clock, vec![
            Reply::Silence,
            Reply::After(2, b"PING 0 1000\n"),
            Reply::After(3, b"PING 1 2500\n"),
            Reply::After(1, b"PING 2 4000\n"),
        ]);
        let config = ScheduleConfig { strict_sequence: true, ..schedule(3) };
        let mut scheduler = scheduler(transport, &clock, config);
        let (stats, _, lines) = run(&mut scheduler);

        assert_eq!(lines, vec![
            "PING 127.0.0.1",
            "Error processing ping response: Receive timed out after 500 ms",
            "PONG 127.0.0.1: seq=1 time=5 ms",
            "PONG 127.0.0.1: seq=2 time=1 ms",
        ]);
        assert_eq!(stats.received(), 2);
    }

    #[test]
    fn test_strict_mode_late_replies_use_up_only_the_remaining_window() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![
            Reply::After(300, b"PING 7 0\n"),
            Reply::After(300, b"PING 8 0\n"),
        ]);
        let config = ScheduleConfig { strict_sequence: true, ..schedule(1) };
        let mut scheduler = scheduler(transport, &clock, config);
        let (stats, record, lines) = run(&mut scheduler);

        // the second datagram lands past the 500 ms window
        assert_eq!(lines[1], "Error processing ping response: unexpected reply for seq=0: \"PING 8 0\"");
        assert_eq!(stats.received(), 0);
        assert_eq!(record.run_end, Some(1000 + 600));
    }

    #[test]
    fn test_backwards_clock_gives_zero_rtt() {
        let clock = ManualClock::new(10_000);
        let transport = ScriptedTransport::new(&clock, vec![Reply::After(-5_000, b"PING 0 0")]);
        let mut scheduler = scheduler(transport, &clock, schedule(1));
        let (stats, record, _) = run(&mut scheduler);

        let summary = stats.finish("h", record.run_start, record.run_end);
        assert_eq!(summary.rtt_max, 0);
        assert_eq!(summary.total_elapsed_ms, 0);
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_does_not_abort_run() {
        let clock = ManualClock::new(0);
        let transport = ScriptedTransport::new(&clock, vec![Reply::After(1, b"a"), Reply::After(1, b"b")]);
        let mut scheduler = scheduler(transport, &clock, schedule(2));
        let mut stats = StatsAggregator::new();
        let record = scheduler.run(&mut stats, &mut BrokenSink);

        assert_eq!(record.probes, 2);
        assert_eq!(stats.received(), 2);
    }

    #[test]
    fn test_schedule_from_config() {
        let config = Config {
            server_ip: "example.org".to_string(),
            server_port: 5021,
            count: 7,
            period_ms: 250,
            timeout_ms: 750,
            strict_sequence: true,
            ..Config::default()
        };
        let schedule = ScheduleConfig::from(&config);
        assert_eq!(schedule.target_host, "example.org");
        assert_eq!(schedule.target_port, 5021);
        assert_eq!(schedule.count, 7);
        assert_eq!(schedule.period, Duration::from_millis(250));
        assert_eq!(schedule.timeout, Duration::from_millis(750));
        assert!(schedule.strict_sequence);
    }
}
