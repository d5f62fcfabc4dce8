//! Master role: drive the escalating ping schedule.
//!
//! For each delay in the schedule the master sends a `PING` announcing that
//! delay, expects a prompt `REPL` within the grace window, then sleeps for
//! `delay - grace` before the next round (the grace already consumed part of
//! the interval). The session ends in success once the schedule is
//! exhausted; the first timeout or I/O error ends it in failure, since that
//! is exactly the signal that the NAT binding has expired.
//!
//! A reply with the wrong tag is logged and tolerated by default; with
//! `strict` set it fails the session instead.

use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::SessionConfig;
use crate::errors::{ProbeError, Result};
use crate::net::ProbeSocket;
use crate::packet::{Packet, Tag};

/// One master session: a socket, a peer, and the schedule to drive.
pub struct MasterSession<'a> {
    socket: &'a ProbeSocket,
    peer: SocketAddr,
    config: SessionConfig,
}

/// Summary of a successful master session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterReport {
    /// Number of ping rounds that completed (one per schedule entry).
    pub rounds: usize,
}

impl<'a> MasterSession<'a> {
    pub fn new(socket: &'a ProbeSocket, peer: SocketAddr, config: SessionConfig) -> Self {
        Self {
            socket,
            peer,
            config,
        }
    }

    /// Run the schedule to completion.
    ///
    /// Visits every delay exactly once, in order. Returns the report once
    /// the schedule is exhausted, or the first terminal error: a timeout
    /// means the binding (or the peer) went away; send and receive I/O
    /// errors are never retried.
    pub fn run(&self) -> Result<MasterReport> {
        info!("started master session with {}", self.peer);

        let mut rounds = 0;
        for delay_secs in self.config.schedule.iter() {
            self.probe_round(delay_secs)?;
            rounds += 1;

            // The reply wait already consumed up to `grace` of the interval.
            let pause = Duration::from_secs(delay_secs as u64).saturating_sub(self.config.grace);
            if !pause.is_zero() {
                debug!("sleeping {:.0}s until the next ping", pause.as_secs_f64());
                thread::sleep(pause);
            }
        }

        info!("schedule exhausted after {} rounds; binding outlived every delay", rounds);
        Ok(MasterReport { rounds })
    }

    /// Send one ping announcing `delay_secs` and wait for its reply.
    fn probe_round(&self, delay_secs: i32) -> Result<()> {
        debug!("sending ping announcing {}s", delay_secs);
        self.socket.send(&Packet::Ping { delay_secs }, self.peer)?;

        match self.socket.recv_timeout(self.config.grace, Some(self.peer)) {
            Ok((Packet::Reply, _)) => {
                debug!("received reply");
                Ok(())
            }
            Ok((other, _)) => self.on_mismatch(ProbeError::ProtocolMismatch {
                expected: Tag::Reply,
                actual: other.tag(),
            }),
            Err(e) if e.is_decode_error() => self.on_mismatch(e),
            Err(e) => Err(e),
        }
    }

    /// Apply the strictness policy to a malformed or mistagged reply.
    fn on_mismatch(&self, err: ProbeError) -> Result<()> {
        if self.config.strict {
            return Err(err);
        }
        warn!("expected reply packet ({}); continuing", err);
        Ok(())
    }
}
