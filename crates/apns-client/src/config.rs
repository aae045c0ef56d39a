//! Service configuration

use apns_core::{
    FEEDBACK_HOST, FEEDBACK_PORT, FEEDBACK_SANDBOX_HOST, GATEWAY_HOST, GATEWAY_PORT,
    GATEWAY_SANDBOX_HOST,
};
use apns_transport::{ConnectionConfig, Endpoint, TlsConfig};
use serde::Deserialize;
use std::path::PathBuf;

/// Settings shared by the gateway and feedback clients of one service handle
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApnsConfig {
    /// Use the sandbox hosts instead of production
    #[serde(default)]
    pub sandbox: bool,
    /// Client certificate (PEM format)
    pub cert_path: PathBuf,
    /// Private key (PEM format); read from `cert_path` when absent
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Trust roots replacing the system store (PEM format)
    #[serde(default)]
    pub ca_path: Option<PathBuf>,
    /// TCP keep-alive interval in seconds (0 = disabled)
    #[serde(default)]
    pub keepalive_secs: u64,
    /// Gateway address override
    #[serde(default)]
    pub gateway: Option<Endpoint>,
    /// Feedback address override
    #[serde(default)]
    pub feedback: Option<Endpoint>,
    #[serde(default)]
    pub connection: ConnectionConfig,
}

impl ApnsConfig {
    pub fn new(cert_path: impl Into<PathBuf>, key_path: Option<PathBuf>) -> Self {
        Self {
            sandbox: false,
            cert_path: cert_path.into(),
            key_path,
            ca_path: None,
            keepalive_secs: 0,
            gateway: None,
            feedback: None,
            connection: ConnectionConfig::default(),
        }
    }

    /// Where notifications are sent
    pub fn gateway_endpoint(&self) -> Endpoint {
        self.gateway.clone().unwrap_or_else(|| {
            let host = if self.sandbox {
                GATEWAY_SANDBOX_HOST
            } else {
                GATEWAY_HOST
            };
            Endpoint::new(host, GATEWAY_PORT)
        })
    }

    /// Where expired tokens are read from
    pub fn feedback_endpoint(&self) -> Endpoint {
        self.feedback.clone().unwrap_or_else(|| {
            let host = if self.sandbox {
                FEEDBACK_SANDBOX_HOST
            } else {
                FEEDBACK_HOST
            };
            Endpoint::new(host, FEEDBACK_PORT)
        })
    }

    /// TLS settings for both clients
    pub fn tls_config(&self) -> TlsConfig {
        TlsConfig {
            cert_path: self.cert_path.clone(),
            key_path: self.key_path.clone(),
            ca_path: self.ca_path.clone(),
            keepalive_secs: self.keepalive_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_endpoints() {
        let config = ApnsConfig::new("cert.pem", None);
        assert_eq!(
            config.gateway_endpoint().to_string(),
            "gateway.push.apple.com:2195"
        );
        assert_eq!(
            config.feedback_endpoint().to_string(),
            "feedback.push.apple.com:2196"
        );
    }

    #[test]
    fn test_sandbox_endpoints() {
        let config = ApnsConfig {
            sandbox: true,
            ..ApnsConfig::new("cert.pem", None)
        };
        assert_eq!(
            config.gateway_endpoint().to_string(),
            "gateway.sandbox.push.apple.com:2195"
        );
        assert_eq!(
            config.feedback_endpoint().to_string(),
            "feedback.sandbox.push.apple.com:2196"
        );
    }

    #[test]
    fn test_override_wins_over_sandbox() {
        let config = ApnsConfig {
            sandbox: true,
            gateway: Some(Endpoint::new("127.0.0.1", 12195)),
            ..ApnsConfig::new("cert.pem", None)
        };
        assert_eq!(config.gateway_endpoint(), Endpoint::new("127.0.0.1", 12195));
        assert_eq!(config.feedback_endpoint().port, FEEDBACK_PORT);
    }

    #[test]
    fn test_deserialize() {
        let config: ApnsConfig = serde_json::from_value(serde_json::json!({
            "sandbox": true,
            "cert_path": "/etc/apns/cert.pem",
            "key_path": "/etc/apns/key.pem",
            "connection": { "check_closed_socket": true, "check_closed_timeout_secs": 0.2 }
        }))
        .unwrap();

        assert!(config.sandbox);
        assert_eq!(config.tls_config().key_path, Some("/etc/apns/key.pem".into()));
        assert!(config.connection.check_closed_socket);
        assert_eq!(
            config.connection.check_closed_timeout,
            std::time::Duration::from_millis(200)
        );
    }
}
