//! Gateway client: sends notifications

use apns_core::{DeviceToken, NotificationFrame, Payload};
use apns_transport::{ConnectionConfig, Connector, Endpoint, SecureConnection, TlsConnector};
use tracing::debug;

use crate::config::ApnsConfig;
use crate::error::Result;

/// Connection to the notification gateway
///
/// Sends are fire-and-forget: the simple format has no acknowledgement,
/// so a successful `send` only means the frame was written. A failed send
/// has already torn the connection down and the next one reconnects.
pub struct GatewayClient<C: Connector = TlsConnector> {
    conn: SecureConnection<C>,
}

impl GatewayClient<TlsConnector> {
    /// Create a TLS gateway client from service configuration
    pub fn new(config: &ApnsConfig) -> Self {
        Self::with_connector(
            TlsConnector::new(config.tls_config()),
            config.gateway_endpoint(),
            config.connection.clone(),
        )
    }
}

impl<C: Connector> GatewayClient<C> {
    pub fn with_connector(connector: C, endpoint: Endpoint, config: ConnectionConfig) -> Self {
        Self {
            conn: SecureConnection::new(connector, endpoint, config),
        }
    }

    /// Send `payload` to the device identified by a hex token
    pub async fn send(&mut self, token_hex: &str, payload: &Payload) -> Result<()> {
        let frame = NotificationFrame::from_hex(token_hex, payload)?;
        self.send_frame(&frame).await
    }

    /// Send `payload` to a parsed device token
    pub async fn send_to(&mut self, token: &DeviceToken, payload: &Payload) -> Result<()> {
        self.send_frame(&NotificationFrame::new(token.clone(), payload))
            .await
    }

    /// Write a prepared frame
    pub async fn send_frame(&mut self, frame: &NotificationFrame) -> Result<()> {
        let bytes = frame.encode()?;
        debug!(
            "Sending {} byte notification to {}",
            bytes.len(),
            frame.token
        );
        self.conn.write(&bytes).await?;
        Ok(())
    }

    pub fn connection(&self) -> &SecureConnection<C> {
        &self.conn
    }

    /// Close the connection; the next send reconnects
    pub async fn close(&mut self) {
        self.conn.disconnect().await;
    }
}
