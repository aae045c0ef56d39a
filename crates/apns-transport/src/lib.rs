//! APNs Transport Layer
//!
//! This crate provides the connection used by the gateway and feedback
//! clients:
//! - [`SecureConnection`]: lazy connect, teardown on error, reconnect on next use
//! - [`Connector`]: how a connection is opened
//! - [`TlsConnector`]: client-certificate TLS (production)
//! - [`TcpConnector`]: plain TCP (relays, testing)

pub mod config;
pub mod connection;
pub mod error;
pub mod traits;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "tls")]
pub mod tls;

pub use config::{ConnectionConfig, Endpoint};
pub use connection::{ReadOutcome, SecureConnection};
pub use error::{Result, TransportError};
pub use traits::Connector;

#[cfg(feature = "tcp")]
pub use tcp::TcpConnector;

#[cfg(feature = "tls")]
pub use tls::{TlsConfig, TlsConnector};
