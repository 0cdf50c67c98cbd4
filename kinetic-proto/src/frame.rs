//! Exact-length reads from a blocking byte stream.

use std::io::{self, Read};

use crate::error::{Error, Result};

/// Reads exactly `n` bytes from `r`.
///
/// Short reads are accumulated until `n` bytes are collected. End-of-stream
/// before that point fails with [`Error::ConnectionClosed`]; a short buffer
/// is never returned. Any deadline comes from the stream itself (e.g. a
/// socket read timeout), which surfaces as [`Error::Io`].
pub fn read_exact(r: &mut impl Read, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    fill(r, &mut buf)?;
    Ok(buf)
}

/// Fills `buf` completely from `r`.
pub(crate) fn fill(r: &mut impl Read, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::ConnectionClosed {
                    expected: buf.len(),
                    received: filled,
                });
            }
            Ok(k) => filled += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(())
}
