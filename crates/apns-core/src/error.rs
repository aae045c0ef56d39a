//! Error types for APNs wire handling

use thiserror::Error;

/// Result type alias for APNs core operations
pub type Result<T> = std::result::Result<T, Error>;

/// APNs core error types
#[derive(Error, Debug)]
pub enum Error {
    /// Encoded payload exceeds the gateway limit
    #[error("payload too large: {size} bytes (max {max})", max = crate::MAX_PAYLOAD_SIZE)]
    PayloadTooLarge { size: usize },

    /// Device token is not valid hex
    #[error("invalid device token: {0}")]
    InvalidToken(String),

    /// Device token does not fit a 16-bit length prefix
    #[error("device token too long: {0} bytes (max 65535)")]
    TokenTooLong(usize),

    /// Frame buffer too small
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall { needed: usize, have: usize },

    /// Unexpected command byte in a notification frame
    #[error("unknown command: 0x{0:02x}")]
    InvalidCommand(u8),

    /// JSON encoding error
    #[error("encode error: {0}")]
    EncodeError(String),
}

impl Error {
    /// Offending encoded size, for [`Error::PayloadTooLarge`]
    pub fn size(&self) -> Option<usize> {
        match self {
            Error::PayloadTooLarge { size } => Some(*size),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::EncodeError(e.to_string())
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::InvalidToken(e.to_string())
    }
}
