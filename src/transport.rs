//! Datagram transport used by the probe loop
//!
//! The scheduler only talks to the [`Transport`] trait so tests can swap
//! the real socket for a scripted one. [`UdpTransport`] is the production
//! implementation: one blocking `std::net::UdpSocket`, opened before the
//! loop and reused for every probe.

use crate::error::{AppError, ProbeError, Result};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Connectionless send/receive with a bounded wait
pub trait Transport {
    /// Send one datagram to `target`
    fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Block for at most `timeout` waiting for a datagram from any sender
    fn recv_from(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<(usize, SocketAddr)>;

    /// Resolve the configured target. Done per probe, so a name that
    /// stops resolving mid-run only loses the affected probes.
    fn resolve(&self, host: &str, port: u16) -> std::result::Result<SocketAddr, ProbeError> {
        resolve_target(host, port)
    }
}

/// Resolve `host:port` to the first address it maps to
pub fn resolve_target(host: &str, port: u16) -> std::result::Result<SocketAddr, ProbeError> {
    resolve_preferring(host, port, |_| true)
}

/// Resolve `host:port`, taking the first address accepted by `usable` and
/// falling back to the first address when none is
fn resolve_preferring<F>(host: &str, port: u16, usable: F) -> std::result::Result<SocketAddr, ProbeError>
where
    F: Fn(&SocketAddr) -> bool,
{
    let failed = |reason: String| ProbeError::Resolve { target: host.to_string(), reason };
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| failed(e.to_string()))?
        .collect();

    addrs
        .iter()
        .find(|addr| usable(*addr))
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| failed("no addresses found".to_string()))
}

/// Blocking UDP socket transport
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind to `addr`
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .map_err(|e| AppError::network(format!("Failed to bind UDP socket on {}: {}", addr, e)))?;
        Ok(Self { socket })
    }

    /// Bind the wildcard address of the family `host` resolves to, on
    /// `local_port` (0 picks a free port). A host that does not resolve
    /// yet gets an IPv4 socket; its probes are reported lost one by one.
    pub fn bind_for_target(host: &str, port: u16, local_port: u16) -> Result<Self> {
        let wildcard = match resolve_target(host, port) {
            Ok(target) if target.is_ipv6() => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Self::bind(SocketAddr::new(wildcard, local_port))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(payload, target)
    }

    fn recv_from(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<(usize, SocketAddr)> {
        // set_read_timeout rejects a zero duration
        self.socket.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        self.socket.recv_from(buf)
    }

    /// Prefer an address the socket's family can reach
    fn resolve(&self, host: &str, port: u16) -> std::result::Result<SocketAddr, ProbeError> {
        match self.socket.local_addr() {
            Ok(local) => resolve_preferring(host, port, |addr| addr.is_ipv4() == local.is_ipv4()),
            Err(_) => resolve_target(host, port),
        }
    }
}
