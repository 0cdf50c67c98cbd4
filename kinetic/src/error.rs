//! Error types for kinetic queries.

use std::io;

use crate::session::{QueryKind, SessionState};

/// Alias for `Result<T, kinetic::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by configuration loading and query sessions.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The requested query kind is neither `chart` nor `articles`.
    #[error("invalid query kind `{0}`, expected `chart` or `articles`")]
    InvalidQueryKind(String),

    /// The TCP connection could not be established.
    #[error("connect to {addr}")]
    Connect {
        /// Address that was dialed.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// A read or write did not complete before its deadline.
    #[error("timed out in state {state}")]
    Timeout {
        /// Session state when the deadline passed.
        state: SessionState,
    },

    /// The server answered, but not with what the exchange requires.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Framing or payload decoding failed.
    #[error(transparent)]
    Wire(#[from] kinetic_proto::Error),

    /// Any other I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Server-side protocol failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The server sent an `ERROR` packet.
    #[error("server error in state {state}: {message}")]
    Server {
        /// Session state when the error arrived.
        state: SessionState,
        /// Server-provided message.
        message: String,
    },

    /// The response type does not match the query kind.
    #[error("unexpected packet type {code:#04x} for {kind} query")]
    UnexpectedPacket {
        /// Query that was sent.
        kind: QueryKind,
        /// Type byte of the response.
        code: u8,
    },
}

/// Coarse outcome class of a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorClass {
    /// The caller passed bad input or configuration; nothing was sent.
    Caller,
    /// The network failed: refused, closed, or timed out.
    Network,
    /// The server responded with an error or with bytes that do not decode.
    Protocol,
}

impl Error {
    /// Classifies the error as caller, network or protocol failure.
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) | Self::InvalidQueryKind(_) => ErrorClass::Caller,
            Self::Connect { .. } | Self::Timeout { .. } | Self::Io(_) => ErrorClass::Network,
            Self::Protocol(_) => ErrorClass::Protocol,
            Self::Wire(e) => match e {
                kinetic_proto::Error::ConnectionClosed { .. } | kinetic_proto::Error::Io(_) => {
                    ErrorClass::Network
                }
                _ => ErrorClass::Protocol,
            },
        }
    }

    /// Maps a wire error raised in `state`, turning socket timeouts into
    /// [`Error::Timeout`].
    pub(crate) fn from_wire(err: kinetic_proto::Error, state: SessionState) -> Self {
        if err.is_timeout() {
            Self::Timeout { state }
        } else {
            Self::Wire(err)
        }
    }
}
