//! Big-endian primitive encodings shared by every payload.
//!
//! ```text
//! u32     [4 bytes BE]
//! f64     [8 bytes BE, IEEE-754]
//! string  [u32 BE byte length][UTF-8 bytes]
//! ```

use crate::error::{Error, Result};

/// Appends `v` as 4 big-endian bytes.
pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

/// Appends `v` as 8 big-endian bytes.
pub fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

/// Appends `s` as a length-prefixed UTF-8 string.
pub fn put_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    put_u32(buf, len_u32(s.len(), "string")?);
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Encodes `s` as a standalone length-prefixed UTF-8 string.
pub fn encode_string(s: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(4 + s.len());
    put_string(&mut buf, s)?;
    Ok(buf)
}

/// Decodes a standalone length-prefixed string occupying all of `bytes`.
pub fn decode_string(bytes: &[u8]) -> Result<String> {
    let mut r = ByteReader::new(bytes);
    let s = r.string()?;
    if r.remaining() != 0 {
        return Err(Error::MalformedString(format!(
            "{} trailing bytes after string",
            r.remaining()
        )));
    }
    Ok(s)
}

/// Converts a buffer length to the protocol's 32-bit length field.
pub(crate) fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::MalformedPacket(format!("{what} of {len} bytes exceeds u32::MAX")))
}

/// Bounds-checked cursor over a fully received payload.
///
/// Every accessor fails instead of reading past the end of the slice.
/// Integer and byte reads report [`Error::MalformedPayload`]; string reads
/// report [`Error::MalformedString`].
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    /// Bytes not yet consumed.
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Wraps `buf`, positioned at its first byte.
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Number of unread bytes.
    pub const fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Consumes the next `n` bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(Error::MalformedPayload(format!(
                "need {n} bytes, {} left",
                self.buf.len()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Reads a big-endian `u32`.
    pub fn u32(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.bytes(4)?);
        Ok(u32::from_be_bytes(raw))
    }

    /// Reads a big-endian IEEE-754 `f64`.
    pub fn f64(&mut self) -> Result<f64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.bytes(8)?);
        Ok(f64::from_be_bytes(raw))
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn string(&mut self) -> Result<String> {
        let len = self
            .u32()
            .map_err(|_| Error::MalformedString("truncated length prefix".into()))?;
        let bytes = self.bytes(len as usize).map_err(|_| {
            Error::MalformedString(format!(
                "declared {len} bytes, {} available",
                self.remaining()
            ))
        })?;
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::MalformedString(e.to_string()))
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(&self, what: &str) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(Error::MalformedPayload(format!(
                "{} unexpected trailing bytes in {what}",
                self.buf.len()
            )))
        }
    }
}
