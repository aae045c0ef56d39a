//! Lazily established connection
//!
//! A [`SecureConnection`] owns at most one stream. The stream is opened on
//! the first read or write, dropped after any I/O failure, and reopened by
//! the next operation. Callers never see a half-open state.

use bytes::Bytes;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, Endpoint};
use crate::error::{Result, TransportError};
use crate::traits::Connector;

/// Upper bound on a graceful close before the stream is just dropped
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of a read with a timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Data read; empty when the peer closed the stream
    Data(Bytes),
    /// Nothing arrived before the timeout
    TimedOut,
    /// The read failed; the error is not surfaced in timeout mode
    NoData,
}

/// A connection to one endpoint through a [`Connector`]
pub struct SecureConnection<C: Connector> {
    connector: C,
    endpoint: Endpoint,
    config: ConnectionConfig,
    stream: Option<C::Stream>,
}

impl<C: Connector> SecureConnection<C> {
    /// Create a disconnected connection
    pub fn new(connector: C, endpoint: Endpoint, config: ConnectionConfig) -> Self {
        Self {
            connector,
            endpoint,
            config,
            stream: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Check if a stream is currently held
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the stream now instead of on first use
    pub async fn connect(&mut self) -> Result<()> {
        self.ensure_connected().await.map(|_| ())
    }

    async fn ensure_connected(&mut self) -> Result<&mut C::Stream> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                info!("Connecting to {}", self.endpoint);
                let stream = self.connector.connect(&self.endpoint).await?;
                info!("Connected to {}", self.endpoint);
                stream
            }
        };

        Ok(self.stream.insert(stream))
    }

    /// Read up to `max_bytes`
    ///
    /// An empty result means the peer closed the stream. Any error tears the
    /// connection down before it is returned.
    pub async fn read(&mut self, max_bytes: usize) -> Result<Bytes> {
        let result = self.read_inner(max_bytes).await;
        if let Err(e) = &result {
            warn!("Read from {} failed: {}", self.endpoint, e);
            self.disconnect().await;
        }
        result
    }

    /// Read up to `max_bytes`, waiting at most `timeout` for data
    ///
    /// Never fails and never tears the connection down: a timeout and any
    /// other error come back as [`ReadOutcome::TimedOut`] and
    /// [`ReadOutcome::NoData`] respectively.
    pub async fn read_timeout(&mut self, max_bytes: usize, timeout: Duration) -> ReadOutcome {
        if let Err(e) = self.ensure_connected().await {
            debug!("Connect to {} failed during timed read: {}", self.endpoint, e);
            return ReadOutcome::NoData;
        }

        match tokio::time::timeout(timeout, self.read_inner(max_bytes)).await {
            Ok(Ok(data)) => ReadOutcome::Data(data),
            Ok(Err(e)) => {
                debug!("Timed read from {} failed: {}", self.endpoint, e);
                ReadOutcome::NoData
            }
            Err(_) => ReadOutcome::TimedOut,
        }
    }

    async fn read_inner(&mut self, max_bytes: usize) -> Result<Bytes> {
        let stream = self.ensure_connected().await?;
        let mut buf = vec![0u8; max_bytes];
        let n = stream.read(&mut buf).await?;
        buf.truncate(n);
        Ok(Bytes::from(buf))
    }

    /// Write all of `data`
    ///
    /// A failed connect is returned as is. With `check_closed_socket`
    /// enabled a one byte probe read then runs on the open stream; unless
    /// it times out the peer is considered gone and the write fails with
    /// [`TransportError::ConnectionClosed`]. Any error tears the connection
    /// down before it is returned.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.config.check_closed_socket {
            self.ensure_connected().await?;
            let outcome = self.read_timeout(1, self.config.check_closed_timeout).await;
            if outcome != ReadOutcome::TimedOut {
                warn!(
                    "Liveness probe on {} returned {:?}, dropping connection",
                    self.endpoint, outcome
                );
                self.disconnect().await;
                return Err(TransportError::ConnectionClosed);
            }
        }

        let result = self.write_inner(data).await;
        if let Err(e) = &result {
            warn!("Write to {} failed: {}", self.endpoint, e);
            self.disconnect().await;
        }
        result
    }

    async fn write_inner(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.ensure_connected().await?;
        stream.write_all(data).await?;
        stream.flush().await?;
        debug!("Wrote {} bytes to {}", data.len(), self.endpoint);
        Ok(())
    }

    /// Close the stream, ignoring close errors; the next operation reconnects
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, stream.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("Ignoring close error on {}: {}", self.endpoint, e),
                Err(_) => debug!("Close of {} timed out", self.endpoint),
            }
            info!("Disconnected from {}", self.endpoint);
        }
    }
}

#[cfg(all(test, feature = "tcp"))]
mod tests {
    use super::*;
    use crate::tcp::TcpConnector;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, Endpoint) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, Endpoint::new("127.0.0.1", port))
    }

    #[tokio::test]
    async fn test_lazy_connect() {
        let (listener, endpoint) = listener().await;
        let mut conn = SecureConnection::new(TcpConnector::new(), endpoint, Default::default());
        assert!(!conn.is_connected());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            buf
        });

        conn.write(b"hello").await.unwrap();
        assert!(conn.is_connected());
        assert_eq!(&server.await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_read_eof_is_empty() {
        let (listener, endpoint) = listener().await;
        let mut conn = SecureConnection::new(TcpConnector::new(), endpoint, Default::default());

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        conn.connect().await.unwrap();
        server.await.unwrap();
        assert!(conn.read(16).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (_listener, endpoint) = listener().await;
        let mut conn = SecureConnection::new(TcpConnector::new(), endpoint, Default::default());
        conn.disconnect().await;
        conn.connect().await.unwrap();
        conn.disconnect().await;
        conn.disconnect().await;
        assert!(!conn.is_connected());
    }
}
