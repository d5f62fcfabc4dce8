//! Run configuration.
//!
//! Role selection is an explicit value handed to [`crate::run`] rather than
//! process-global state: the binary parses flags once, builds a [`Config`],
//! and every session object owns its own copy of the knobs it needs.

use std::time::Duration;

use crate::schedule::DelaySchedule;
use crate::DEFAULT_GRACE;

/// Which side of the rendezvous this process plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Listen for handshakes on `port` and serve the complementary role.
    Server { port: u16 },
    /// Send a handshake to `host:port` and run the announced role.
    Client { host: String, port: u16 },
}

/// The role a client announces in its handshake (and then plays itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Announce {
    /// Announce `SLAV` and reply to the server's pings (the default).
    #[default]
    Slave,
    /// Announce `MAST` and drive the ping schedule against the server.
    Master,
}

/// Full process configuration built by the CLI front end.
#[derive(Debug, Clone)]
pub struct Config {
    pub role: Role,
    /// Client-mode announcement; ignored in server mode.
    pub announce: Announce,
    /// Treat a malformed reply in a master session as session-fatal.
    pub strict: bool,
    /// Grace window added to every receive deadline.
    pub grace: Duration,
    /// Ping schedule driven by master sessions.
    pub schedule: DelaySchedule,
}

impl Config {
    /// Configuration for the given role with all protocol defaults.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            announce: Announce::default(),
            strict: false,
            grace: DEFAULT_GRACE,
            schedule: DelaySchedule::default(),
        }
    }

    /// The per-session subset of this configuration.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            grace: self.grace,
            strict: self.strict,
            schedule: self.schedule.clone(),
        }
    }
}

/// Knobs a single master or slave session runs with, independent of how the
/// session was started (dispatcher or client bootstrap).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub grace: Duration,
    pub strict: bool,
    pub schedule: DelaySchedule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            strict: false,
            schedule: DelaySchedule::default(),
        }
    }
}
