//! Connection configuration

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, TransportError};

/// Default liveness probe timeout
pub const DEFAULT_CHECK_CLOSED_TIMEOUT: Duration = Duration::from_millis(500);

/// Environment toggle for the liveness probe
pub const ENV_CHECK_CLOSED_SOCKET: &str = "APNS_CHECK_CLOSED_SOCKET";

/// Environment override for the probe timeout, in seconds
pub const ENV_CHECK_CLOSED_SOCKET_TIMEOUT: &str = "APNS_CHECK_CLOSED_SOCKET_TIMEOUT";

/// A remote host and port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    /// Parse `host:port`
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| TransportError::InvalidEndpoint(format!("missing port in {s:?}")))?;
        if host.is_empty() {
            return Err(TransportError::InvalidEndpoint(format!(
                "missing host in {s:?}"
            )));
        }
        let port = port
            .parse()
            .map_err(|e| TransportError::InvalidEndpoint(format!("{s:?}: {e}")))?;
        Ok(Self::new(host, port))
    }
}

/// Behaviour of a [`SecureConnection`](crate::SecureConnection)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Probe for a peer-closed socket before every write
    pub check_closed_socket: bool,
    /// How long the probe waits for data
    #[serde(deserialize_with = "deserialize_secs", rename = "check_closed_timeout_secs")]
    pub check_closed_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            check_closed_socket: false,
            check_closed_timeout: DEFAULT_CHECK_CLOSED_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Read the probe settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the probe settings through `lookup`
    ///
    /// Any non-empty value of `APNS_CHECK_CLOSED_SOCKET` enables the probe.
    /// An unparsable or negative timeout keeps the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let check_closed_socket = lookup(ENV_CHECK_CLOSED_SOCKET).is_some_and(|v| !v.is_empty());
        let check_closed_timeout = lookup(ENV_CHECK_CLOSED_SOCKET_TIMEOUT)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(DEFAULT_CHECK_CLOSED_TIMEOUT);

        Self {
            check_closed_socket,
            check_closed_timeout,
        }
    }

    /// Enable or disable the pre-write liveness probe
    pub fn with_check_closed_socket(mut self, enabled: bool) -> Self {
        self.check_closed_socket = enabled;
        self
    }

    /// Set the liveness probe timeout
    pub fn with_check_closed_timeout(mut self, timeout: Duration) -> Self {
        self.check_closed_timeout = timeout;
        self
    }
}

fn deserialize_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
