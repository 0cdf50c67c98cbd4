//! Blocking client for the Kinetic news analytics server.
//!
//! Each query opens a TCP connection, sends the client handshake, issues a
//! single chart or article query, decodes the response, and closes the
//! connection. Failures come back as an [`Error`] whose [`Error::class`]
//! tells caller mistakes, network failures and protocol failures apart.
//!
//! # Quick start
//!
//! ```no_run
//! use kinetic::{Client, ClientConfig, SentimentStats};
//!
//! let client = Client::new(ClientConfig::default())?;
//! let articles = client.articles("нефть")?;
//! if let Some(stats) = SentimentStats::from_articles(&articles) {
//!     println!("{:.1}% positive", stats.positive);
//! }
//! # Ok::<(), kinetic::Error>(())
//! ```

mod client;
mod config;
mod error;
mod sentiment;
mod session;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, ErrorClass, ProtocolError, Result};
pub use kinetic_proto::{Article, ChartMap};
pub use sentiment::{NEGATIVE_BELOW, POSITIVE_ABOVE, Sentiment, SentimentCounts, SentimentStats};
pub use session::{QueryKind, QueryResult, Session, SessionState, Transport};
