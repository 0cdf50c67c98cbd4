//! Client configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Connection settings for a [`Client`](crate::Client).
///
/// Defaults point at the public analytics server. In JSON, durations are
/// given in (possibly fractional) seconds under `*_secs` keys:
///
/// ```json
/// { "host": "127.0.0.1", "port": 3500, "io_timeout_secs": 5 }
/// ```
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use kinetic::ClientConfig;
///
/// let config = ClientConfig::default()
///     .host("127.0.0.1")
///     .io_timeout(Duration::from_secs(5));
/// assert_eq!(config.addr(), "127.0.0.1:3500");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ClientConfig {
    /// Server host name or IP address.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// Identifier sent in the handshake.
    pub client_id: String,
    /// Limit for establishing the TCP connection.
    #[serde(rename = "connect_timeout_secs", with = "secs")]
    pub connect_timeout: Duration,
    /// Limit for any single read or write.
    #[serde(rename = "io_timeout_secs", with = "secs")]
    pub io_timeout: Duration,
    /// Limit for the whole handshake + query + response exchange.
    #[serde(rename = "deadline_secs", with = "secs")]
    pub deadline: Duration,
    /// Largest response payload accepted, in bytes.
    pub max_payload: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "kinetic-world-dynamic.ru".to_owned(),
            port: kinetic_proto::SERVER_PORT,
            client_id: "Analytical".to_owned(),
            connect_timeout: Duration::from_secs(10),
            io_timeout: Duration::from_secs(30),
            deadline: Duration::from_secs(60),
            max_payload: kinetic_proto::MAX_PAYLOAD,
        }
    }
}

impl ClientConfig {
    /// Loads a configuration from a JSON file. Missing keys keep defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the server host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the handshake client identifier.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, t: Duration) -> Self {
        self.connect_timeout = t;
        self
    }

    /// Sets the per-read/per-write timeout.
    #[must_use]
    pub const fn io_timeout(mut self, t: Duration) -> Self {
        self.io_timeout = t;
        self
    }

    /// Sets the deadline for a whole exchange.
    #[must_use]
    pub const fn deadline(mut self, t: Duration) -> Self {
        self.deadline = t;
        self
    }

    /// Sets the largest accepted response payload.
    #[must_use]
    pub const fn max_payload(mut self, bytes: u32) -> Self {
        self.max_payload = bytes;
        self
    }

    /// `host:port`, as dialed.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks that the configuration can be used to open a session.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::Config("host is empty".into()));
        }
        if self.client_id.is_empty() {
            return Err(Error::Config("client_id is empty".into()));
        }
        for (name, t) in [
            ("connect_timeout", self.connect_timeout),
            ("io_timeout", self.io_timeout),
            ("deadline", self.deadline),
        ] {
            // Zero is rejected by `set_read_timeout`, and would mean "expired" here.
            if t.is_zero() {
                return Err(Error::Config(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// Serde adapter: `Duration` as fractional seconds.
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `d` as seconds.
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    /// Deserializes non-negative seconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let v = f64::deserialize(d)?;
        Duration::try_from_secs_f64(v).map_err(serde::de::Error::custom)
    }
}
