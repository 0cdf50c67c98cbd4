//! One handshake + query + response exchange.
//!
//! ```text
//! Connected ──handshake──▶ HandshakeSent ──ack──▶ HandshakeAcked
//!     ──request──▶ QuerySent ──response──▶ ResponseDecoded
//! ```
//!
//! Any failure ends the session with an [`Error`]; there is no recovery and
//! no reuse. The query packet is only written after a non-`ERROR` handshake
//! reply has been received.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::str::FromStr;
use std::time::{Duration, Instant};

use kinetic_proto::{Article, ChartMap, Packet, PacketType};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, ProtocolError, Result};

/// The two query kinds the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum QueryKind {
    /// Date-bucketed counts, answered with `DATA_PAYLOAD`.
    Chart,
    /// Article search, answered with `ARTICLE_SET`.
    Articles,
}

impl QueryKind {
    /// Packet type of the request.
    pub const fn request_type(self) -> PacketType {
        match self {
            Self::Chart => PacketType::GetDataChart,
            Self::Articles => PacketType::SearchQuery,
        }
    }

    /// Packet type of a successful response.
    pub const fn response_type(self) -> PacketType {
        match self {
            Self::Chart => PacketType::DataPayload,
            Self::Articles => PacketType::ArticleSet,
        }
    }

    /// Name used on the command line and in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Articles => "articles",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chart" => Ok(Self::Chart),
            "articles" => Ok(Self::Articles),
            _ => Err(Error::InvalidQueryKind(s.to_owned())),
        }
    }
}

/// Progress of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionState {
    /// Transport open (or being opened), nothing sent yet.
    Connected,
    /// Client identifier written, waiting for the server's reply.
    HandshakeSent,
    /// Server accepted the handshake.
    HandshakeAcked,
    /// Query packet written, waiting for the response.
    QuerySent,
    /// Response received and decoded.
    ResponseDecoded,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::HandshakeSent => "handshake-sent",
            Self::HandshakeAcked => "handshake-acked",
            Self::QuerySent => "query-sent",
            Self::ResponseDecoded => "response-decoded",
        })
    }
}

/// Decoded response of a query.
///
/// Serializes as the bare decoded value: a JSON object for charts, an array
/// for articles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum QueryResult {
    /// Response to [`QueryKind::Chart`].
    Chart(ChartMap),
    /// Response to [`QueryKind::Articles`], in server order.
    Articles(Vec<Article>),
}

impl QueryResult {
    /// The chart map, if this is a chart result.
    pub fn into_chart(self) -> Option<ChartMap> {
        match self {
            Self::Chart(m) => Some(m),
            Self::Articles(_) => None,
        }
    }

    /// The articles, if this is an article result.
    pub fn into_articles(self) -> Option<Vec<Article>> {
        match self {
            Self::Articles(a) => Some(a),
            Self::Chart(_) => None,
        }
    }
}

/// A byte stream whose blocking operations can be bounded.
pub trait Transport: Read + Write {
    /// Bounds every subsequent read and write by `timeout`.
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(timeout))?;
        self.set_write_timeout(Some(timeout))
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_io_timeout(timeout)
    }
}

/// Transport wrapper enforcing the exchange deadline on every read and
/// write, not just once per packet.
#[derive(Debug)]
struct Deadline<T> {
    /// Wrapped transport.
    inner: T,
    /// Bound for any single read or write.
    io_timeout: Duration,
    /// Instant by which the whole exchange must finish.
    at: Instant,
}

impl<T: Transport> Deadline<T> {
    /// Bounds the next call by `min(io_timeout, time left)`.
    fn arm(&mut self) -> io::Result<()> {
        let left = self.at.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "exchange deadline elapsed",
            ));
        }
        self.inner.set_io_timeout(self.io_timeout.min(left))
    }
}

impl<T: Transport> Read for Deadline<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.arm()?;
        self.inner.read(buf)
    }
}

impl<T: Transport> Write for Deadline<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.arm()?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.arm()?;
        self.inner.flush()
    }
}

/// A single-use protocol session over `T`.
///
/// The transport is owned and dropped when the session finishes, whichever
/// way it finishes. Pass `&mut T` to keep it.
#[derive(Debug)]
pub struct Session<T> {
    /// Deadline-bounded byte stream.
    stream: Deadline<T>,
    /// Identifier sent in the handshake.
    client_id: String,
    /// Largest accepted response payload.
    max_payload: u32,
    /// Current state.
    state: SessionState,
}

impl<T: Transport> Session<T> {
    /// Wraps an open transport. The exchange deadline starts now.
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            stream: Deadline {
                inner: transport,
                io_timeout: config.io_timeout,
                at: Instant::now() + config.deadline,
            },
            client_id: config.client_id.clone(),
            max_payload: config.max_payload,
            state: SessionState::Connected,
        }
    }

    /// Current state: [`SessionState::Connected`] for a new session,
    /// [`SessionState::HandshakeAcked`] after [`Session::handshake`].
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Sends the client identifier and waits for the server's reply.
    ///
    /// Any reply other than `ERROR` is accepted. On failure the session
    /// (and its transport) is dropped. A session that is already past the
    /// handshake is returned unchanged.
    pub fn handshake(mut self) -> Result<Self> {
        if self.state != SessionState::Connected {
            return Ok(self);
        }
        kinetic_proto::write_handshake(&mut self.stream, &self.client_id)
            .map_err(|e| Error::from_wire(e, self.state))?;
        self.advance(SessionState::HandshakeSent);

        let ack = self.recv()?;
        if ack.is_error() {
            return Err(self.server_error(&ack));
        }
        if !ack.payload.is_empty() {
            debug!(code = ack.code, len = ack.payload.len(), "handshake ack carries a payload");
        }
        self.advance(SessionState::HandshakeAcked);
        Ok(self)
    }

    /// Runs the query for `kind`, handshaking first if needed, and decodes
    /// the response.
    pub fn query(self, kind: QueryKind, query: &str) -> Result<QueryResult> {
        match kind {
            QueryKind::Chart => self.chart(query).map(QueryResult::Chart),
            QueryKind::Articles => self.articles(query).map(QueryResult::Articles),
        }
    }

    /// Runs a chart query.
    pub fn chart(self, query: &str) -> Result<ChartMap> {
        let (mut session, packet) = self.exchange(QueryKind::Chart, query)?;
        let map = kinetic_proto::decode_chart_map(&packet.payload)?;
        session.advance(SessionState::ResponseDecoded);
        debug!(entries = map.len(), "chart decoded");
        Ok(map)
    }

    /// Runs an article search.
    pub fn articles(self, query: &str) -> Result<Vec<Article>> {
        let (mut session, packet) = self.exchange(QueryKind::Articles, query)?;
        let articles = kinetic_proto::decode_article_set(&packet.payload)?;
        session.advance(SessionState::ResponseDecoded);
        debug!(articles = articles.len(), "article set decoded");
        Ok(articles)
    }

    /// Handshake, request, and a response of the type `kind` expects.
    fn exchange(self, kind: QueryKind, query: &str) -> Result<(Self, Packet)> {
        // Encode up front so a local failure never leaves a half-done exchange.
        let request = Packet::new(kind.request_type(), kinetic_proto::encode_string(query)?);
        let mut session = self.handshake()?;

        kinetic_proto::write_packet(&mut session.stream, &request)
            .map_err(|e| Error::from_wire(e, session.state))?;
        session.advance(SessionState::QuerySent);

        let response = session.recv()?;
        if response.is_error() {
            return Err(session.server_error(&response));
        }
        if response.code != kind.response_type().code() {
            warn!(%kind, code = response.code, "unexpected response packet");
            return Err(ProtocolError::UnexpectedPacket {
                kind,
                code: response.code,
            }
            .into());
        }
        Ok((session, response))
    }

    /// Receives one packet within the remaining time budget.
    fn recv(&mut self) -> Result<Packet> {
        kinetic_proto::read_packet_limited(&mut self.stream, self.max_payload)
            .map_err(|e| Error::from_wire(e, self.state))
    }

    /// Builds the error for a server `ERROR` packet.
    fn server_error(&self, packet: &Packet) -> Error {
        let message = packet.error_message();
        warn!(state = %self.state, %message, "server returned error");
        ProtocolError::Server {
            state: self.state,
            message,
        }
        .into()
    }

    /// Moves to `next`.
    fn advance(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session");
        self.state = next;
    }
}
