//! Service handle: one gateway and one feedback client per configuration

use apns_transport::{Connector, TlsConnector};
use tracing::debug;

use crate::builder::ApnsBuilder;
use crate::config::ApnsConfig;
use crate::feedback::FeedbackClient;
use crate::gateway::GatewayClient;

/// Entry point for a push service account
///
/// Clients are created on first access and reused for the lifetime of the
/// handle, so each role holds at most one live connection.
pub struct Apns<C: Connector + Clone = TlsConnector> {
    config: ApnsConfig,
    connector: C,
    gateway: Option<GatewayClient<C>>,
    feedback: Option<FeedbackClient<C>>,
}

impl Apns<TlsConnector> {
    /// Create a handle that authenticates with the configured certificate
    pub fn new(config: ApnsConfig) -> Self {
        let connector = TlsConnector::new(config.tls_config());
        Self::with_connector(config, connector)
    }

    /// Create a builder
    pub fn builder(cert_path: impl Into<std::path::PathBuf>) -> ApnsBuilder {
        ApnsBuilder::new(cert_path)
    }
}

impl<C: Connector + Clone> Apns<C> {
    /// Create a handle that opens connections through `connector`
    pub fn with_connector(config: ApnsConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            gateway: None,
            feedback: None,
        }
    }

    pub fn config(&self) -> &ApnsConfig {
        &self.config
    }

    pub fn is_sandbox(&self) -> bool {
        self.config.sandbox
    }

    /// The gateway client, created on first use
    pub fn gateway(&mut self) -> &mut GatewayClient<C> {
        let config = &self.config;
        let connector = &self.connector;
        self.gateway.get_or_insert_with(|| {
            debug!("Creating gateway client for {}", config.gateway_endpoint());
            GatewayClient::with_connector(
                connector.clone(),
                config.gateway_endpoint(),
                config.connection.clone(),
            )
        })
    }

    /// The feedback client, created on first use
    pub fn feedback(&mut self) -> &mut FeedbackClient<C> {
        let config = &self.config;
        let connector = &self.connector;
        self.feedback.get_or_insert_with(|| {
            debug!("Creating feedback client for {}", config.feedback_endpoint());
            FeedbackClient::with_connector(
                connector.clone(),
                config.feedback_endpoint(),
                config.connection.clone(),
            )
        })
    }

    /// Close whichever connections are open
    pub async fn close(&mut self) {
        if let Some(gateway) = self.gateway.as_mut() {
            gateway.close().await;
        }
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.close().await;
        }
    }
}
