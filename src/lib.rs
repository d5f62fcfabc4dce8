//! udpnat - UDP NAT binding timeout prober
//!
//! Measures how long a NAT or firewall keeps a UDP mapping alive by pairing
//! two endpoints: a **master** that sends keepalive pings on an escalating
//! delay schedule, and a **slave** that waits for each ping and replies. The
//! first ping whose reply never arrives reveals the effective binding
//! timeout.
//!
//! # Design Principles
//! - Blocking, single-threaded UDP I/O throughout; one active session per
//!   socket at a time
//! - Fixed 512-byte datagrams with a 4-byte ASCII tag, no framing beyond that
//! - All timing flows from one grace window: the master waits `grace` for a
//!   reply, the slave waits the announced delay plus `grace` for the next
//!   ping

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod master;
pub mod net;
pub mod packet;
pub mod schedule;
pub mod slave;

pub use config::{Announce, Config, Role};
pub use errors::{ProbeError, Result};
pub use packet::{Packet, Tag, PACKET_LEN, TAG_LEN};
pub use schedule::DelaySchedule;

use std::time::Duration;

/// Grace window added to every receive deadline, in seconds.
///
/// The master expects a prompt reply within this window regardless of the
/// delay it just announced; the slave waits the announced delay plus this
/// window for the next ping.
pub const GRACE_SECS: u64 = 5;

/// Default grace window as a [`Duration`].
pub const DEFAULT_GRACE: Duration = Duration::from_secs(GRACE_SECS);

/// Default ping delay schedule, in seconds.
///
/// Consumed in order by a master session; the session ends successfully once
/// the last delay has been probed.
pub const DEFAULT_DELAYS: [i32; 10] = [15, 30, 60, 90, 120, 150, 180, 240, 300, 600];

/// Run the process in the role described by `config`.
///
/// This is the single entry point the binary calls after argument parsing.
/// Socket creation and bind failures propagate out of here and are the only
/// process-fatal errors; session-level failures in server mode are handled
/// inside the dispatcher loop.
pub fn run(config: &Config) -> Result<()> {
    match &config.role {
        Role::Server { port } => {
            let dispatcher = dispatcher::Dispatcher::bind(*port, config.session())?;
            dispatcher.run()
        }
        Role::Client { host, port } => client::run(host, *port, config.announce, config.session()),
    }
}
