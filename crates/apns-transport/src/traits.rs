//! Transport trait definitions

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::Endpoint;
use crate::error::Result;

/// Opens the byte stream a [`SecureConnection`](crate::SecureConnection) runs over
#[async_trait]
pub trait Connector: Send + Sync {
    /// The established stream
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connect to a remote endpoint
    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Stream>;
}
