//! Client error types

use apns_transport::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Bad input: oversized payload, malformed token
    #[error("protocol error: {0}")]
    Protocol(#[from] apns_core::Error),

    /// Connect, TLS, read or write failure; the connection is already torn down
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// Encoded size of a rejected payload
    pub fn payload_size(&self) -> Option<usize> {
        match self {
            ClientError::Protocol(e) => e.size(),
            ClientError::Transport(_) => None,
        }
    }

    /// True when the liveness probe found the peer gone
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::ConnectionClosed))
    }
}
