//! Client-certificate TLS connector
//!
//! The binary APNs services authenticate the provider by its TLS client
//! certificate. Certificate and key are read from PEM files the first time
//! a connection is opened and the resulting rustls configuration is reused
//! for every reconnect.

use async_trait::async_trait;
use parking_lot::Mutex;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::{debug, info};

use crate::config::Endpoint;
use crate::error::{Result, TransportError};
use crate::tcp::open_tcp;
use crate::traits::Connector;

/// TLS identity and trust settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsConfig {
    /// Path to the client certificate chain (PEM format)
    pub cert_path: PathBuf,
    /// Path to the private key (PEM format); read from `cert_path` when absent
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Root certificates to trust instead of the system store (PEM format)
    #[serde(default)]
    pub ca_path: Option<PathBuf>,
    /// Keep-alive interval in seconds (0 = disabled)
    #[serde(default)]
    pub keepalive_secs: u64,
}

impl TlsConfig {
    pub fn new(cert_path: impl Into<PathBuf>, key_path: Option<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path,
            ca_path: None,
            keepalive_secs: 0,
        }
    }

    /// Trust only the roots in this PEM file
    pub fn with_ca_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_path = Some(path.into());
        self
    }

    /// Enable TCP keepalive on the underlying socket
    pub fn with_keepalive(mut self, secs: u64) -> Self {
        self.keepalive_secs = secs;
        self
    }

    /// Build the rustls client configuration
    pub fn build(&self) -> Result<ClientConfig> {
        let certs = load_certificates(&self.cert_path)?;
        if certs.is_empty() {
            return Err(TransportError::Certificate(format!(
                "no certificates found in {}",
                self.cert_path.display()
            )));
        }

        let key_path = self.key_path.as_deref().unwrap_or(&self.cert_path);
        let key = load_private_key(key_path)?;
        let roots = root_store(self.ca_path.as_deref())?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| TransportError::Tls(format!("protocol versions: {e}")))?
            .with_root_certificates(roots)
            .with_client_auth_cert(certs, key)
            .map_err(|e| TransportError::Tls(format!("client config error: {e}")))
    }
}

/// Connector that performs a client-authenticated TLS handshake
#[derive(Clone)]
pub struct TlsConnector {
    config: TlsConfig,
    client_config: Arc<Mutex<Option<Arc<ClientConfig>>>>,
}

impl TlsConnector {
    pub fn new(config: TlsConfig) -> Self {
        Self {
            config,
            client_config: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &TlsConfig {
        &self.config
    }

    fn client_config(&self) -> Result<Arc<ClientConfig>> {
        let mut cached = self.client_config.lock();
        if let Some(config) = cached.as_ref() {
            return Ok(config.clone());
        }

        let config = Arc::new(self.config.build()?);
        debug!(
            "Loaded client certificate from {}",
            self.config.cert_path.display()
        );
        *cached = Some(config.clone());
        Ok(config)
    }
}

impl std::fmt::Debug for TlsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConnector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for TlsConnector {
    type Stream = TlsStream<TcpStream>;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Stream> {
        let client_config = self.client_config()?;
        let server_name = ServerName::try_from(endpoint.host.clone())
            .map_err(|e| TransportError::InvalidServerName(format!("{}: {e}", endpoint.host)))?;

        let tcp = open_tcp(endpoint, self.config.keepalive_secs).await?;
        let stream = tokio_rustls::TlsConnector::from(client_config)
            .connect(server_name, tcp)
            .await
            .map_err(|e| TransportError::Tls(format!("handshake with {endpoint} failed: {e}")))?;

        info!("TLS established with {}", endpoint);
        Ok(stream)
    }
}

/// Parse PEM-encoded certificates from a file
fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let pem = std::fs::read(path)
        .map_err(|e| TransportError::Certificate(format!("{}: {e}", path.display())))?;
    rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            TransportError::Certificate(format!(
                "failed to parse certificates in {}: {e}",
                path.display()
            ))
        })
}

/// Parse the first PEM-encoded private key from a file
fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let pem = std::fs::read(path)
        .map_err(|e| TransportError::PrivateKey(format!("{}: {e}", path.display())))?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|e| {
            TransportError::PrivateKey(format!(
                "failed to parse private key in {}: {e}",
                path.display()
            ))
        })?
        .ok_or_else(|| {
            TransportError::PrivateKey(format!("no private key found in {}", path.display()))
        })
}

/// Custom roots if given, otherwise the system store
fn root_store(ca_path: Option<&Path>) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();

    if let Some(path) = ca_path {
        for cert in load_certificates(path)? {
            roots.add(cert).map_err(|e| {
                TransportError::Certificate(format!("failed to add CA certificate: {e}"))
            })?;
        }
        info!("Using {} custom root certificates", roots.len());
    } else {
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            debug!("Certificate loading error: {}", err);
        }
        for cert in result.certs {
            if let Err(e) = roots.add(cert) {
                debug!("Failed to add system cert: {}", e);
            }
        }
        info!("Loaded {} system root certificates", roots.len());
    }

    if roots.is_empty() {
        return Err(TransportError::Certificate(
            "no root certificates available".to_string(),
        ));
    }
    Ok(roots)
}
