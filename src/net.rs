//! Blocking UDP socket wrapper for probe sessions.
//!
//! [`ProbeSocket`] speaks [`Packet`] instead of raw bytes and owns the two
//! receive primitives everything else is built on:
//! - [`ProbeSocket::recv_timeout`] — block until a datagram arrives or a
//!   deadline elapses, optionally validating the sender against the session
//!   peer.
//! - [`ProbeSocket::recv_handshake`] — block indefinitely for the next
//!   rendezvous handshake.
//!
//! UDP delivers whole datagrams, so there are no partial reads; a datagram
//! larger than [`PACKET_LEN`] is truncated by the transport and the excess
//! is not detected (accepted limitation, the protocol never sends one).

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::errors::{ProbeError, Result};
use crate::packet::{Packet, PACKET_LEN};

/// A blocking, packet-oriented UDP socket.
///
/// One socket carries at most one active session at a time; the dispatcher
/// reuses the same socket across sequential sessions.
#[derive(Debug)]
pub struct ProbeSocket {
    inner: UdpSocket,
}

impl ProbeSocket {
    /// Bind a new socket to `addr`.
    ///
    /// Passing port 0 lets the OS choose an ephemeral port, which is what
    /// client mode does.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let inner = UdpSocket::bind(addr)?;
        Ok(Self { inner })
    }

    /// Local address this socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Encode `packet` and send it as one full-size datagram to `dest`.
    ///
    /// # Errors
    /// [`ProbeError::ShortSend`] if the transport accepted fewer than
    /// [`PACKET_LEN`] bytes; the fixed packet must go out atomically.
    pub fn send(&self, packet: &Packet, dest: SocketAddr) -> Result<()> {
        let bytes = packet.encode();
        let sent = self.inner.send_to(&bytes, dest)?;
        if sent != PACKET_LEN {
            return Err(ProbeError::ShortSend { sent });
        }
        Ok(())
    }

    /// Block until a datagram arrives or `timeout` elapses.
    ///
    /// When `expected` is set, a datagram from any other sender fails the
    /// call with [`ProbeError::UnexpectedPeer`] rather than being silently
    /// trusted.
    ///
    /// # Errors
    /// - [`ProbeError::InvalidTimeout`] for a zero `timeout`; deadlines
    ///   must be positive.
    /// - [`ProbeError::Timeout`] if the deadline elapses with no datagram.
    /// - [`ProbeError::Io`] for any other transport failure.
    /// - Decode errors from [`Packet::decode`] pass through unchanged.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
        expected: Option<SocketAddr>,
    ) -> Result<(Packet, SocketAddr)> {
        if timeout.is_zero() {
            return Err(ProbeError::InvalidTimeout);
        }
        self.inner.set_read_timeout(Some(timeout))?;

        let mut buf = [0u8; PACKET_LEN];
        match self.inner.recv_from(&mut buf) {
            Ok((len, addr)) => {
                if let Some(peer) = expected {
                    if addr != peer {
                        return Err(ProbeError::UnexpectedPeer {
                            expected: peer,
                            actual: addr,
                        });
                    }
                }
                let packet = Packet::decode(&buf[..len])?;
                Ok((packet, addr))
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                Err(ProbeError::Timeout { after: timeout })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Block indefinitely for the next datagram from any source.
    ///
    /// Used by the dispatcher between sessions; clears any read deadline a
    /// previous session left on the socket.
    pub fn recv_handshake(&self) -> Result<(Packet, SocketAddr)> {
        self.inner.set_read_timeout(None)?;

        let mut buf = [0u8; PACKET_LEN];
        let (len, addr) = self.inner.recv_from(&mut buf)?;
        let packet = Packet::decode(&buf[..len])?;
        Ok((packet, addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (ProbeSocket, ProbeSocket, SocketAddr, SocketAddr) {
        let a = ProbeSocket::bind("127.0.0.1:0").unwrap();
        let b = ProbeSocket::bind("127.0.0.1:0").unwrap();
        let addr_a = a.local_addr().unwrap();
        let addr_b = b.local_addr().unwrap();
        (a, b, addr_a, addr_b)
    }

    #[test]
    fn send_and_receive_ping() {
        let (a, b, addr_a, addr_b) = pair();
        a.send(&Packet::Ping { delay_secs: 30 }, addr_b).unwrap();

        let (packet, from) = b
            .recv_timeout(Duration::from_secs(1), Some(addr_a))
            .unwrap();
        assert_eq!(packet, Packet::Ping { delay_secs: 30 });
        assert_eq!(from, addr_a);
    }

    #[test]
    fn deadline_elapses_with_timeout_error() {
        let (a, _b, _addr_a, _addr_b) = pair();
        let timeout = Duration::from_millis(50);
        assert_eq!(
            a.recv_timeout(timeout, None),
            Err(ProbeError::Timeout { after: timeout })
        );
    }

    #[test]
    fn zero_deadline_is_rejected() {
        let (a, _b, _addr_a, _addr_b) = pair();
        assert_eq!(
            a.recv_timeout(Duration::ZERO, None),
            Err(ProbeError::InvalidTimeout)
        );
    }

    #[test]
    fn datagram_from_wrong_sender_fails_distinctly() {
        let (a, b, addr_a, addr_b) = pair();
        let c = ProbeSocket::bind("127.0.0.1:0").unwrap();
        let addr_c = c.local_addr().unwrap();

        c.send(&Packet::Reply, addr_b).unwrap();
        let err = b
            .recv_timeout(Duration::from_secs(1), Some(addr_a))
            .unwrap_err();
        assert_eq!(
            err,
            ProbeError::UnexpectedPeer {
                expected: addr_a,
                actual: addr_c,
            }
        );
        drop(a);
    }

    #[test]
    fn handshake_receive_returns_sender() {
        let (a, b, addr_a, addr_b) = pair();
        a.send(&Packet::Slave, addr_b).unwrap();

        let (packet, from) = b.recv_handshake().unwrap();
        assert_eq!(packet, Packet::Slave);
        assert_eq!(from, addr_a);
    }
}
