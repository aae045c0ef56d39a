//! TCP transport implementation
//!
//! Plain TCP connector. The binary APNs services require TLS, so this is for
//! talking to a TLS-terminating relay or to a local test server. The TLS
//! connector opens its underlying socket through [`open_tcp`] as well.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::config::Endpoint;
use crate::error::{Result, TransportError};
use crate::traits::Connector;

/// Plain TCP connector
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    /// Keep-alive interval in seconds (0 = disabled)
    keepalive_secs: u64,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable TCP keepalive with the given interval
    pub fn with_keepalive(mut self, secs: u64) -> Self {
        self.keepalive_secs = secs;
        self
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, endpoint: &Endpoint) -> Result<TcpStream> {
        open_tcp(endpoint, self.keepalive_secs).await
    }
}

/// Open a TCP stream, applying keepalive if configured
pub(crate) async fn open_tcp(endpoint: &Endpoint, keepalive_secs: u64) -> Result<TcpStream> {
    info!("Connecting to TCP: {}", endpoint);

    let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|e| TransportError::ConnectionFailed(format!("{endpoint}: {e}")))?;

    if keepalive_secs > 0 {
        let socket = socket2::SockRef::from(&stream);
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(keepalive_secs));
        if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
            debug!("Failed to enable keepalive on {}: {}", endpoint, e);
        }
    }

    if let Err(e) = stream.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY on {}: {}", endpoint, e);
    }

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let connector = TcpConnector::new().with_keepalive(30);
        let stream = connector
            .connect(&Endpoint::new("127.0.0.1", addr.port()))
            .await
            .unwrap();

        let (_, peer) = listener.accept().await.unwrap();
        assert_eq!(stream.local_addr().unwrap(), peer);
    }

    #[tokio::test]
    async fn test_tcp_connect_refused() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = TcpConnector::new()
            .connect(&Endpoint::new("127.0.0.1", port))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed(_)));
    }
}
