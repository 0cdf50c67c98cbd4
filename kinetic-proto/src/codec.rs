//! Packet and handshake framing over any `Read`/`Write` stream.
//!
//! Every packet is: `[u8 type][u32 big-endian length][payload]`.
//!
//! The client handshake is the one exception: it is written as a bare
//! length-prefixed string, `[u32 big-endian length][UTF-8 client id]`, with
//! no type byte. Servers expect exactly this asymmetry, so it must not be
//! wrapped in a [`Packet`].

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::frame::{self, read_exact};
use crate::message::Packet;
use crate::wire::{self, len_u32};

/// Default maximum accepted packet payload (64 MiB).
pub const MAX_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Size of the packet header: type byte plus length.
pub const HEADER_LEN: usize = 5;

impl Packet {
    /// Serializes the packet into its wire form.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = len_u32(self.payload.len(), "packet payload")?;
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.push(self.code);
        wire::put_u32(&mut buf, len);
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }
}

/// Writes `packet` to `w` and flushes.
pub fn write_packet<W: Write>(w: &mut W, packet: &Packet) -> Result<()> {
    w.write_all(&packet.encode()?)?;
    w.flush()?;
    Ok(())
}

/// Reads one packet from `r`, rejecting payloads above [`MAX_PAYLOAD`].
pub fn read_packet(r: &mut impl Read) -> Result<Packet> {
    read_packet_limited(r, MAX_PAYLOAD)
}

/// Reads one packet from `r`, rejecting payloads above `limit` bytes.
///
/// The limit is checked before the payload buffer is allocated.
pub fn read_packet_limited(r: &mut impl Read, limit: u32) -> Result<Packet> {
    let mut header = [0u8; HEADER_LEN];
    frame::fill(r, &mut header)?;
    let code = header[0];
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > limit {
        return Err(Error::MalformedPacket(format!(
            "type {code:#04x} declares {len} byte payload, limit is {limit}"
        )));
    }
    let payload = if len > 0 {
        read_exact(r, len as usize)?
    } else {
        Vec::new()
    };
    Ok(Packet { code, payload })
}

/// Writes the unframed client handshake and flushes.
pub fn write_handshake<W: Write>(w: &mut W, client_id: &str) -> Result<()> {
    w.write_all(&wire::encode_string(client_id)?)?;
    w.flush()?;
    Ok(())
}

/// Reads an unframed client handshake, as a server would.
///
/// Client identifiers are short; anything above `limit` bytes is rejected.
pub fn read_handshake(r: &mut impl Read, limit: u32) -> Result<String> {
    let mut prefix = [0u8; 4];
    frame::fill(r, &mut prefix)?;
    let len = u32::from_be_bytes(prefix);
    if len > limit {
        return Err(Error::MalformedString(format!(
            "handshake declares {len} bytes, limit is {limit}"
        )));
    }
    let bytes = read_exact(r, len as usize)?;
    String::from_utf8(bytes).map_err(|e| Error::MalformedString(e.to_string()))
}
