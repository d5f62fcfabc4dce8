//! Client mode: announce a role to a listening dispatcher, then play it.
//!
//! The client binds an ephemeral socket, sends a `SLAV` or `MAST` handshake
//! to the server, and immediately enters the announced role against that
//! peer. Announcing slave (the default) lets the server's master drive the
//! measurement; announcing master flips the direction and measures from
//! this side.

use std::net::{SocketAddr, ToSocketAddrs};

use log::info;

use crate::config::{Announce, SessionConfig};
use crate::errors::{ProbeError, Result};
use crate::master::MasterSession;
use crate::net::ProbeSocket;
use crate::packet::Packet;
use crate::slave::SlaveSession;

/// Connect to `host:port`, announce `announce`, and run that role until the
/// session ends.
pub fn run(host: &str, port: u16, announce: Announce, config: SessionConfig) -> Result<()> {
    let server = resolve(host, port)?;
    let socket = ProbeSocket::bind("0.0.0.0:0")?;

    let handshake = match announce {
        Announce::Slave => Packet::Slave,
        Announce::Master => Packet::Master,
    };
    info!("announcing {} to {}", handshake.tag(), server);
    socket.send(&handshake, server)?;

    match announce {
        Announce::Slave => SlaveSession::new(&socket, server, config).run(),
        Announce::Master => {
            let report = MasterSession::new(&socket, server, config).run()?;
            info!("measurement complete: {} rounds acknowledged", report.rounds);
            Ok(())
        }
    }
}

/// Resolve `host:port` to the first usable socket address.
fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| ProbeError::Io(format!("no address found for host {}", host)))
}
