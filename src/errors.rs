//! Error types for probe protocol operations.
//!
//! One enum covers every failure mode in the probe pipeline: socket I/O,
//! receive deadlines, malformed datagrams, and protocol-level violations.
//! Session code never retries internally; each of these is terminal for the
//! session that hits it (except where the master's strictness policy says
//! otherwise, see [`crate::master`]).

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use crate::packet::Tag;

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Probe protocol error enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// I/O error (socket create/bind/send/receive failure).
    Io(String),

    /// No datagram arrived within the receive deadline.
    Timeout { after: Duration },

    /// The timed receive was invoked with a zero deadline.
    InvalidTimeout,

    /// A datagram arrived from a sender other than the session peer.
    UnexpectedPeer {
        expected: SocketAddr,
        actual: SocketAddr,
    },

    /// Datagram too short to carry the 4-byte tag (or a tagged payload).
    ShortDatagram { len: usize },

    /// The transport accepted fewer bytes than the fixed packet length.
    ShortSend { sent: usize },

    /// The leading 4 bytes matched none of the known tags.
    UnknownTag([u8; 4]),

    /// A decodable packet arrived where a different tag was required.
    ProtocolMismatch { expected: Tag, actual: Tag },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Timeout { after } => {
                write!(f, "timed out after {:.1}s with no datagram", after.as_secs_f64())
            }
            Self::InvalidTimeout => write!(f, "receive deadline must be greater than zero"),
            Self::UnexpectedPeer { expected, actual } => {
                write!(f, "datagram from unexpected peer {} (session peer is {})", actual, expected)
            }
            Self::ShortDatagram { len } => {
                write!(f, "datagram too short to decode: {} bytes", len)
            }
            Self::ShortSend { sent } => {
                write!(f, "partial send: {} of {} bytes", sent, crate::packet::PACKET_LEN)
            }
            Self::UnknownTag(bytes) => {
                write!(f, "unknown packet tag {:?}", bytes)
            }
            Self::ProtocolMismatch { expected, actual } => {
                write!(f, "protocol mismatch: expected {} packet, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl ProbeError {
    /// True for errors that mean "the datagram was garbage" rather than
    /// "the transport failed": the dispatcher ignores these and keeps
    /// listening, and a lenient master logs them instead of aborting.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::ShortDatagram { .. } | Self::UnknownTag(_))
    }
}
