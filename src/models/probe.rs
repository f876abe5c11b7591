//! Probe envelope, per-probe outcome and reply decoding

use crate::error::ProbeError;
use std::net::SocketAddr;

/// Largest reply the client will read; longer datagrams are truncated.
pub const MAX_REPLY_SIZE: usize = 1024;

/// One outbound probe. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Position in the run, starting at 0
    pub sequence: u64,
    /// Wall-clock send time in milliseconds since the Unix epoch
    pub sent_at: i64,
}

impl Probe {
    pub fn new(sequence: u64, sent_at: i64) -> Self {
        Self { sequence, sent_at }
    }

    /// Wire form: a single text line `PING <sequence> <sent_at>\n`
    pub fn encode(&self) -> Vec<u8> {
        format!("PING {} {}\n", self.sequence, self.sent_at).into_bytes()
    }
}

/// Resolved result of one probe. Exactly one is produced per probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Received {
        sequence: u64,
        rtt_ms: u64,
        from: SocketAddr,
    },
    Lost {
        sequence: u64,
        reason: ProbeError,
    },
}

impl Outcome {
    pub fn sequence(&self) -> u64 {
        match self {
            Outcome::Received { sequence, .. } | Outcome::Lost { sequence, .. } => *sequence,
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, Outcome::Received { .. })
    }

    pub fn rtt_ms(&self) -> Option<u64> {
        match self {
            Outcome::Received { rtt_ms, .. } => Some(*rtt_ms),
            Outcome::Lost { .. } => None,
        }
    }
}

/// Best-effort view of an inbound datagram.
///
/// Decoding never fails: invalid UTF-8 is replaced and a missing newline
/// just means the whole payload is the first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoReply {
    pub from: SocketAddr,
    pub first_line: String,
}

impl EchoReply {
    pub fn parse(payload: &[u8], from: SocketAddr) -> Self {
        let end = payload
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(payload.len());
        let first_line = String::from_utf8_lossy(&payload[..end]).into_owned();
        Self { from, first_line }
    }

    /// Sequence number echoed back, if the first line reads
    /// `PING <n> ...` or `PONG <n> ...`
    pub fn echoed_sequence(&self) -> Option<u64> {
        let mut parts = self.first_line.split_whitespace();
        match parts.next() {
            Some(tag) if tag.eq_ignore_ascii_case("PING") || tag.eq_ignore_ascii_case("PONG") => {
                parts.next()?.parse().ok()
            }
            _ => None,
        }
    }
}
