//! Wire format for probe datagrams.
//!
//! Every datagram is a fixed [`PACKET_LEN`]-byte buffer. No I/O happens
//! here; this module is pure data transformation.
//!
//! # Wire format
//!
//! | Offset | Length | Meaning                                          |
//! |--------|--------|--------------------------------------------------|
//! | 0      | 4      | ASCII tag: `MAST`, `SLAV`, `PING`, `REPL`        |
//! | 4      | 4      | `i32` delay in seconds, little-endian (`PING`)   |
//! | 8      | 504    | zero-filled, reserved                            |
//!
//! `MAST` and `SLAV` are handshake packets announcing the sender's intended
//! role; `PING` announces the delay until the next ping; `REPL` carries no
//! payload at all.

use crate::errors::{ProbeError, Result};

/// Fixed size of every datagram on the wire, in bytes.
pub const PACKET_LEN: usize = 512;

/// Length of the leading ASCII tag, in bytes.
pub const TAG_LEN: usize = 4;

// Byte offsets within the serialised packet.
const OFF_TAG: usize = 0;
const OFF_DELAY: usize = 4;

/// The four packet kinds, identified by their leading 4-byte ASCII tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Handshake: sender announces it will act as master.
    Master,
    /// Handshake: sender announces it will act as slave.
    Slave,
    /// Keepalive probe carrying the delay until the next ping.
    Ping,
    /// Answer to a ping; no payload.
    Reply,
}

impl Tag {
    /// The raw 4-byte ASCII form written at offset 0 of every packet.
    pub const fn as_bytes(self) -> [u8; TAG_LEN] {
        match self {
            Tag::Master => *b"MAST",
            Tag::Slave => *b"SLAV",
            Tag::Ping => *b"PING",
            Tag::Reply => *b"REPL",
        }
    }

    /// Map raw tag bytes back to a [`Tag`], or `None` for unknown bytes.
    pub fn from_bytes(bytes: [u8; TAG_LEN]) -> Option<Self> {
        match &bytes {
            b"MAST" => Some(Tag::Master),
            b"SLAV" => Some(Tag::Slave),
            b"PING" => Some(Tag::Ping),
            b"REPL" => Some(Tag::Reply),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tags are ASCII by construction.
        let bytes = self.as_bytes();
        write!(f, "{}", std::str::from_utf8(&bytes).unwrap_or("????"))
    }
}

/// A decoded probe datagram.
///
/// Only `Ping` carries a payload. Constructing a packet guarantees a valid
/// tag, so encoding can never produce an unknown packet kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    /// `MAST` handshake.
    Master,
    /// `SLAV` handshake.
    Slave,
    /// `PING` probe announcing the delay until the next ping, in seconds.
    Ping { delay_secs: i32 },
    /// `REPL` answer.
    Reply,
}

impl Packet {
    /// The tag this packet carries on the wire.
    pub fn tag(&self) -> Tag {
        match self {
            Packet::Master => Tag::Master,
            Packet::Slave => Tag::Slave,
            Packet::Ping { .. } => Tag::Ping,
            Packet::Reply => Tag::Reply,
        }
    }

    /// Serialise this packet into a full fixed-size wire buffer.
    ///
    /// The tag lands at offset 0, the ping delay (if any) at offset 4, and
    /// the remainder stays zero-filled.
    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        buf[OFF_TAG..OFF_TAG + TAG_LEN].copy_from_slice(&self.tag().as_bytes());
        if let Packet::Ping { delay_secs } = self {
            buf[OFF_DELAY..OFF_DELAY + 4].copy_from_slice(&delay_secs.to_le_bytes());
        }
        buf
    }

    /// Parse a [`Packet`] from a received datagram.
    ///
    /// # Errors
    /// - [`ProbeError::ShortDatagram`] if `buf` cannot hold the tag, or a
    ///   `PING` tag arrived without its 4-byte delay.
    /// - [`ProbeError::UnknownTag`] if the leading bytes match no known tag.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < TAG_LEN {
            return Err(ProbeError::ShortDatagram { len: buf.len() });
        }

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&buf[OFF_TAG..OFF_TAG + TAG_LEN]);
        let tag = Tag::from_bytes(tag_bytes).ok_or(ProbeError::UnknownTag(tag_bytes))?;

        match tag {
            Tag::Master => Ok(Packet::Master),
            Tag::Slave => Ok(Packet::Slave),
            Tag::Reply => Ok(Packet::Reply),
            Tag::Ping => {
                if buf.len() < OFF_DELAY + 4 {
                    return Err(ProbeError::ShortDatagram { len: buf.len() });
                }
                let delay_secs =
                    i32::from_le_bytes(buf[OFF_DELAY..OFF_DELAY + 4].try_into().unwrap());
                Ok(Packet::Ping { delay_secs })
            }
        }
    }
}
