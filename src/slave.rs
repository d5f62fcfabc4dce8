//! Slave role: answer pings for as long as they keep arriving.
//!
//! The slave never initiates. It waits for a ping, immediately replies, and
//! adopts the delay the ping announced as the basis for its next wait
//! window (`announced delay + grace`). The first wait uses the bare grace
//! window, since no delay has been announced yet. There is no success
//! state: the loop runs until a timeout or I/O error ends the session.

use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::SessionConfig;
use crate::errors::Result;
use crate::net::ProbeSocket;
use crate::packet::Packet;

/// One slave session: a socket, the peer whose pings it answers, and the
/// grace window shaping its wait deadlines.
pub struct SlaveSession<'a> {
    socket: &'a ProbeSocket,
    peer: SocketAddr,
    config: SessionConfig,
}

impl<'a> SlaveSession<'a> {
    pub fn new(socket: &'a ProbeSocket, peer: SocketAddr, config: SessionConfig) -> Self {
        Self {
            socket,
            peer,
            config,
        }
    }

    /// Serve pings until the session dies.
    ///
    /// Always returns an error: a timeout once the master stops pinging
    /// (the normal end of a measurement), or the underlying I/O failure.
    pub fn run(&self) -> Result<()> {
        info!("started slave session with {}", self.peer);

        let mut wait = self.config.grace;
        loop {
            wait = self.serve_one(wait)?;
        }
    }

    /// Wait up to `wait` for one ping, reply to it, and return the wait
    /// window for the next iteration.
    ///
    /// Packets that are not pings (mistagged or undecodable) are logged and
    /// skipped without a reply, and the current wait window is kept.
    pub fn serve_one(&self, wait: Duration) -> Result<Duration> {
        debug!("waiting up to {:.0}s for ping", wait.as_secs_f64());

        match self.socket.recv_timeout(wait, Some(self.peer)) {
            Ok((Packet::Ping { delay_secs }, _)) => {
                debug!("received ping announcing {}s; sending reply", delay_secs);
                self.socket.send(&Packet::Reply, self.peer)?;

                // A hostile master could announce a negative delay; clamp it
                // so the wait window never shrinks below the grace.
                let announced = Duration::from_secs(delay_secs.max(0) as u64);
                Ok(announced + self.config.grace)
            }
            Ok((other, _)) => {
                warn!("expected ping packet, got {}; ignoring", other.tag());
                Ok(wait)
            }
            Err(e) if e.is_decode_error() => {
                warn!("ignoring undecodable packet: {}", e);
                Ok(wait)
            }
            Err(e) => Err(e),
        }
    }
}
