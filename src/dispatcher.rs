//! Rendezvous dispatcher: server mode.
//!
//! One socket bound to a configured port. The loop blocks for a handshake
//! packet, then activates the role *complementary* to the one the peer
//! announced, addressed at the announcing peer. Sessions run strictly
//! sequentially; while a session is active no new handshake is served.
//!
//! A session ending (in success or failure) is not fatal: the dispatcher
//! logs it as "peer session ended" and resumes listening on the same
//! socket. Only failures of the rendezvous socket itself propagate.

use std::net::SocketAddr;

use log::{debug, info, warn};

use crate::config::SessionConfig;
use crate::errors::Result;
use crate::master::MasterSession;
use crate::net::ProbeSocket;
use crate::packet::Packet;
use crate::slave::SlaveSession;

/// The role the dispatcher plays in response to a handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Master,
    Slave,
}

/// Map a handshake packet to the complementary local role.
///
/// A peer announcing `SLAV` needs a master to drive it; a peer announcing
/// `MAST` needs a slave to answer it. Anything else starts no session.
pub fn complementary_role(handshake: &Packet) -> Option<SessionKind> {
    match handshake {
        Packet::Slave => Some(SessionKind::Master),
        Packet::Master => Some(SessionKind::Slave),
        Packet::Ping { .. } | Packet::Reply => None,
    }
}

/// Server-mode rendezvous loop over one bound socket.
pub struct Dispatcher {
    socket: ProbeSocket,
    config: SessionConfig,
    port: u16,
}

impl Dispatcher {
    /// Bind the rendezvous socket on all interfaces at `port`.
    ///
    /// A bind failure here is process-fatal; the caller reports it and
    /// exits.
    pub fn bind(port: u16, config: SessionConfig) -> Result<Self> {
        let socket = ProbeSocket::bind(("0.0.0.0", port))?;
        Ok(Self {
            socket,
            config,
            port,
        })
    }

    /// Address the rendezvous socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve handshakes forever.
    ///
    /// Returns only if the rendezvous socket itself fails.
    pub fn run(&self) -> Result<()> {
        loop {
            info!("listening on port {}...", self.port);

            let (handshake, peer) = match self.socket.recv_handshake() {
                Ok(received) => received,
                Err(e) if e.is_decode_error() => {
                    debug!("ignoring undecodable datagram: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            info!("incoming {} packet from {}", handshake.tag(), peer);

            match complementary_role(&handshake) {
                Some(SessionKind::Master) => self.serve_master(peer),
                Some(SessionKind::Slave) => self.serve_slave(peer),
                None => debug!("{} is not a handshake; still listening", handshake.tag()),
            }
        }
    }

    fn serve_master(&self, peer: SocketAddr) {
        match MasterSession::new(&self.socket, peer, self.config.clone()).run() {
            Ok(report) => info!(
                "peer session ended: {} completed all {} rounds",
                peer, report.rounds
            ),
            Err(e) => warn!("peer session ended: master session with {} failed: {}", peer, e),
        }
    }

    fn serve_slave(&self, peer: SocketAddr) {
        // The slave loop has no success exit; it always ends in an error,
        // normally a timeout once the peer's master stops pinging.
        if let Err(e) = SlaveSession::new(&self.socket, peer, self.config.clone()).run() {
            info!("peer session ended: slave session with {}: {}", peer, e);
        }
    }
}
