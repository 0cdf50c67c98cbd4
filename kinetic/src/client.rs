//! Blocking client: one fresh TCP connection per query.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};

use kinetic_proto::{Article, ChartMap};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{QueryKind, QueryResult, Session, SessionState};

/// Client for the analytics server.
///
/// Holds only configuration; every query dials a new connection, runs one
/// [`Session`], and closes the socket before returning.
///
/// ```no_run
/// use kinetic::{Client, ClientConfig};
///
/// let client = Client::new(ClientConfig::default().host("127.0.0.1"))?;
/// for (day, count) in client.chart("bitcoin")? {
///     println!("{day}: {count}");
/// }
/// # Ok::<(), kinetic::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Validated connection settings.
    config: ClientConfig,
}

impl Client {
    /// Creates a client after validating `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The client's configuration.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs a query of the given kind.
    pub fn query(&self, kind: QueryKind, query: &str) -> Result<QueryResult> {
        Session::new(self.connect()?, &self.config).query(kind, query)
    }

    /// Runs a query whose kind is given by name (`"chart"` or `"articles"`).
    ///
    /// An unknown kind fails before any connection is attempted.
    pub fn fetch(&self, kind: &str, query: &str) -> Result<QueryResult> {
        let kind: QueryKind = kind.parse()?;
        self.query(kind, query)
    }

    /// Fetches chart data for `query`.
    pub fn chart(&self, query: &str) -> Result<ChartMap> {
        Session::new(self.connect()?, &self.config).chart(query)
    }

    /// Searches articles matching `query`.
    pub fn articles(&self, query: &str) -> Result<Vec<Article>> {
        Session::new(self.connect()?, &self.config).articles(query)
    }

    /// Dials the server, trying each resolved address in turn.
    fn connect(&self) -> Result<TcpStream> {
        let addr = self.config.addr();
        let connect_err = |source: io::Error| Error::Connect {
            addr: addr.clone(),
            source,
        };

        let mut last = None;
        for sock in addr.to_socket_addrs().map_err(connect_err)? {
            match TcpStream::connect_timeout(&sock, self.config.connect_timeout) {
                Ok(stream) => {
                    debug!(%sock, "connected");
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%sock, error = %e, "connect failed");
                    last = Some(e);
                }
            }
        }

        Err(match last {
            Some(e) if e.kind() == io::ErrorKind::TimedOut => Error::Timeout {
                state: SessionState::Connected,
            },
            Some(e) => connect_err(e),
            None => connect_err(io::Error::new(
                io::ErrorKind::NotFound,
                "host resolved to no addresses",
            )),
        })
    }
}
