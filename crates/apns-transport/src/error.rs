//! Transport error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The liveness probe saw the peer close or send unexpected data
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("tls error: {0}")]
    Tls(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("private key error: {0}")]
    PrivateKey(String),

    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
