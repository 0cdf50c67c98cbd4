//! Decode and encode failures for the wire protocol.

use std::io;

/// Alias for `Result<T, kinetic_proto::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while framing or decoding protocol bytes.
///
/// Decoders fail fast: any of these invalidates the whole packet or payload,
/// and no partially decoded value is ever returned alongside it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The peer closed the stream before the requested bytes arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed {
        /// Number of bytes the reader was asked for.
        expected: usize,
        /// Number of bytes received before end-of-stream.
        received: usize,
    },

    /// The packet envelope is inconsistent (oversized or unencodable).
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// A chart or article payload does not match its declared layout.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A length-prefixed string is truncated or not valid UTF-8.
    #[error("malformed string: {0}")]
    MalformedString(String),

    /// Transport-level failure, including read/write timeouts.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` if the underlying transport reported a timeout.
    ///
    /// Sockets with a read timeout report `WouldBlock` on Unix and
    /// `TimedOut` on Windows; both are treated the same.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Io(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
        )
    }
}
