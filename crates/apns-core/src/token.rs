//! Device tokens
//!
//! A token is opaque binary on the wire and lowercase hex at the API
//! boundary. Production tokens are 32 bytes, but nothing here insists on
//! that: the feedback service reports whatever length it stored.

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// An opaque device token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceToken(Bytes);

impl DeviceToken {
    /// Parse a token from its hex form
    ///
    /// Odd-length strings and non-hex characters are rejected.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(bytes)
    }

    /// Wrap raw token bytes
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > u16::MAX as usize {
            return Err(Error::TokenTooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for DeviceToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for DeviceToken {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
