//! Wake-on-LAN magic packet emitter and TCP port prober
//!
//! The magic packet is the standard 102-byte frame: six 0xFF bytes followed
//! by the target MAC repeated sixteen times, sent as a single UDP datagram
//! to the broadcast address on port 9. The prober polls a TCP endpoint once
//! per second until it opens or the deadline passes; callers use the pair to
//! wake a server and block until NFS is reachable.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};

/// UDP port NICs listen on for wake frames
pub const WOL_PORT: u16 = 9;

/// Upper bound for a single TCP connect attempt
const CONNECT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Interval between connect attempts
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A Wake-on-LAN frame: 6 bytes of 0xFF followed by the MAC repeated 16 times
///
/// Immutable after construction; `as_bytes` exposes the wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket {
    frame: [u8; 102],
}

impl MagicPacket {
    /// Build a frame from a textual MAC address.
    ///
    /// Accepts colon, dash, or bare hex notation; anything that does not
    /// normalize to exactly six bytes is rejected.
    pub fn new(mac: &str) -> Result<Self> {
        let mac = parse_mac(mac)?;

        let mut frame = [0u8; 102];
        frame[..6].fill(0xFF);
        for i in 0..16 {
            let base = 6 + i * 6;
            frame[base..base + 6].copy_from_slice(&mac);
        }
        Ok(Self { frame })
    }

    /// The raw 102-byte wire form
    pub fn as_bytes(&self) -> &[u8; 102] {
        &self.frame
    }

    /// Broadcast the frame as a single UDP datagram to `broadcast_ip:9`.
    ///
    /// No retries; the caller decides whether a failed send is fatal.
    pub fn send(&self, broadcast_ip: Ipv4Addr) -> Result<()> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .map_err(|e| Error::Transport(format!("bind udp socket: {e}")))?;
        socket
            .set_broadcast(true)
            .map_err(|e| Error::Transport(format!("enable broadcast: {e}")))?;

        let addr = SocketAddrV4::new(broadcast_ip, WOL_PORT);
        socket
            .send_to(&self.frame, addr)
            .map_err(|e| Error::Transport(format!("send magic packet to {addr}: {e}")))?;
        debug!("magic packet sent to {}", addr);
        Ok(())
    }
}

/// Normalize a textual MAC into six bytes.
///
/// Separators (`:`, `-`) are stripped; the remainder must be twelve hex
/// digits.
pub fn parse_mac(mac: &str) -> Result<[u8; 6]> {
    let hex: String = mac.chars().filter(|c| *c != ':' && *c != '-').collect();
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidInput(format!("malformed MAC address: {mac}")));
    }

    let mut out = [0u8; 6];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| Error::InvalidInput(format!("malformed MAC address: {mac}")))?;
    }
    Ok(out)
}

/// Poll `host:port` with one TCP connect per second until the port opens.
///
/// Each attempt is bounded by one second; refused, reset, and unreachable
/// are all retryable. Returns `Timeout` once `timeout` has elapsed without
/// a successful connect.
pub async fn wait_for_port(host: &str, port: u16, timeout: Duration) -> Result<()> {
    let target = format!("{host}:{port}");
    let addr = resolve(&target)?;
    let deadline = Instant::now() + timeout;

    loop {
        let attempt_started = Instant::now();
        let connect = tokio::net::TcpStream::connect(addr);
        match tokio::time::timeout(CONNECT_ATTEMPT_TIMEOUT, connect).await {
            Ok(Ok(_stream)) => return Ok(()),
            Ok(Err(e)) => debug!("connect {} failed: {}", target, e),
            Err(_) => debug!("connect {} attempt timed out", target),
        }

        if Instant::now() >= deadline {
            return Err(Error::Timeout(format!("waiting for {target}")));
        }

        // Keep the one-attempt-per-second cadence even when connects fail fast
        let elapsed = attempt_started.elapsed();
        if elapsed < POLL_INTERVAL {
            tokio::time::sleep(POLL_INTERVAL - elapsed).await;
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout(format!("waiting for {target}")));
        }
    }
}

fn resolve(target: &str) -> Result<SocketAddr> {
    target
        .to_socket_addrs()
        .map_err(|e| Error::Transport(format!("resolve {target}: {e}")))?
        .next()
        .ok_or_else(|| Error::Transport(format!("no address for {target}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_packet_layout() {
        let packet = MagicPacket::new("AA:BB:CC:DD:EE:FF").unwrap();
        let bytes = packet.as_bytes();

        assert_eq!(bytes.len(), 102);
        assert_eq!(&bytes[..6], &[0xFF; 6]);

        let mac = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
        for i in 0..16 {
            let base = 6 + i * 6;
            assert_eq!(&bytes[base..base + 6], &mac, "repetition {i}");
        }
        // Spot-check the last repetition explicitly
        assert_eq!(&bytes[96..102], &mac);
    }

    #[test]
    fn test_parse_mac_formats() {
        let expected = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
        assert_eq!(parse_mac("00:11:22:33:44:55").unwrap(), expected);
        assert_eq!(parse_mac("00-11-22-33-44-55").unwrap(), expected);
        assert_eq!(parse_mac("001122334455").unwrap(), expected);
    }

    #[test]
    fn test_parse_mac_rejects_garbage() {
        assert!(parse_mac("").is_err());
        assert!(parse_mac("00:11:22:33:44").is_err());
        assert!(parse_mac("00:11:22:33:44:55:66").is_err());
        assert!(parse_mac("zz:11:22:33:44:55").is_err());
        assert!(parse_mac("00 11 22 33 44 55").is_err());
    }

    #[tokio::test]
    async fn test_wait_for_port_open() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Keep the listener alive while probing
        let result = wait_for_port("127.0.0.1", port, Duration::from_secs(3)).await;
        drop(listener);
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_port_timeout() {
        // Bind then drop to obtain a port that is very likely closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let started = Instant::now();
        let result = wait_for_port("127.0.0.1", port, Duration::from_millis(1500)).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
        // Should have returned around the deadline, not immediately
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
