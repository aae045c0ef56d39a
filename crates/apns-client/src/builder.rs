//! Service handle builder

use apns_transport::{Connector, Endpoint};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ApnsConfig;
use crate::service::Apns;

/// Builder for [`Apns`]
#[derive(Debug, Clone)]
pub struct ApnsBuilder {
    config: ApnsConfig,
}

impl ApnsBuilder {
    /// Create a builder for the certificate at `cert_path`
    pub fn new(cert_path: impl Into<PathBuf>) -> Self {
        Self {
            config: ApnsConfig::new(cert_path, None),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: ApnsConfig) -> Self {
        Self { config }
    }

    /// Use the sandbox hosts
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Private key file, if not bundled with the certificate
    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.key_path = Some(path.into());
        self
    }

    /// Trust only the roots in this file
    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ca_path = Some(path.into());
        self
    }

    /// TCP keepalive interval in seconds
    pub fn keepalive(mut self, secs: u64) -> Self {
        self.config.keepalive_secs = secs;
        self
    }

    /// Send notifications to another address
    pub fn gateway_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.gateway = Some(endpoint);
        self
    }

    /// Read feedback from another address
    pub fn feedback_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.feedback = Some(endpoint);
        self
    }

    /// Enable/disable the pre-write liveness probe
    pub fn check_closed_socket(mut self, enabled: bool) -> Self {
        self.config.connection.check_closed_socket = enabled;
        self
    }

    /// Set the liveness probe timeout
    pub fn check_closed_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection.check_closed_timeout = timeout;
        self
    }

    pub fn config(&self) -> &ApnsConfig {
        &self.config
    }

    /// Build a TLS service handle
    pub fn build(self) -> Apns {
        Apns::new(self.config)
    }

    /// Build a handle that connects through `connector`
    pub fn build_with_connector<C: Connector + Clone>(self, connector: C) -> Apns<C> {
        Apns::with_connector(self.config, connector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_settings() {
        let builder = ApnsBuilder::new("cert.pem")
            .key_file("key.pem")
            .sandbox(true)
            .keepalive(30)
            .check_closed_socket(true)
            .check_closed_timeout(Duration::from_millis(100));

        let config = builder.config();
        assert!(config.sandbox);
        assert_eq!(config.key_path, Some(PathBuf::from("key.pem")));
        assert_eq!(config.keepalive_secs, 30);
        assert!(config.connection.check_closed_socket);
        assert_eq!(
            config.connection.check_closed_timeout,
            Duration::from_millis(100)
        );

        let apns = builder.build();
        assert!(apns.is_sandbox());
    }
}
