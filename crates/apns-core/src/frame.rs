//! Gateway notification framing
//!
//! Simple notification format:
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Byte 0:       Command (0x00)                         │
//! │ Bytes 1-2:    Token length (uint16 big-endian)       │
//! │ Bytes 3..n:   Token                                  │
//! │ Next 2 bytes: Payload length (uint16 big-endian)     │
//! │ Remainder:    Payload (compact JSON)                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! There is no identifier and no response: a frame is fire-and-forget.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{peek_u16, put_prefixed};
use crate::{DeviceToken, Error, Payload, Result, COMMAND_SIMPLE};

/// Command byte plus the token length prefix
pub const TOKEN_HEADER_SIZE: usize = 3;

/// Size of the payload length prefix
pub const PAYLOAD_HEADER_SIZE: usize = 2;

/// A notification frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFrame {
    pub token: DeviceToken,
    pub payload: Bytes,
}

impl NotificationFrame {
    /// Create a frame from a validated payload
    pub fn new(token: DeviceToken, payload: &Payload) -> Self {
        Self {
            token,
            payload: payload.encoded().clone(),
        }
    }

    /// Create a frame from a hex token
    pub fn from_hex(token_hex: &str, payload: &Payload) -> Result<Self> {
        Ok(Self::new(DeviceToken::from_hex(token_hex)?, payload))
    }

    /// Calculate the total frame size
    pub fn size(&self) -> usize {
        TOKEN_HEADER_SIZE + self.token.len() + PAYLOAD_HEADER_SIZE + self.payload.len()
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> Result<Bytes> {
        if self.token.len() > u16::MAX as usize {
            return Err(Error::TokenTooLong(self.token.len()));
        }
        if self.payload.len() > u16::MAX as usize {
            return Err(Error::PayloadTooLarge {
                size: self.payload.len(),
            });
        }

        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_u8(COMMAND_SIMPLE);
        put_prefixed(&mut buf, self.token.as_bytes());
        put_prefixed(&mut buf, &self.payload);

        Ok(buf.freeze())
    }

    /// Decode frame from bytes
    pub fn decode(mut buf: impl Buf) -> Result<Self> {
        if buf.remaining() < TOKEN_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                needed: TOKEN_HEADER_SIZE,
                have: buf.remaining(),
            });
        }

        let command = buf.get_u8();
        if command != COMMAND_SIMPLE {
            return Err(Error::InvalidCommand(command));
        }

        let token_len = buf.get_u16() as usize;
        if buf.remaining() < token_len + PAYLOAD_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                needed: TOKEN_HEADER_SIZE + token_len + PAYLOAD_HEADER_SIZE,
                have: TOKEN_HEADER_SIZE + buf.remaining(),
            });
        }
        let token = DeviceToken::from_bytes(buf.copy_to_bytes(token_len))?;

        let payload_len = buf.get_u16() as usize;
        if buf.remaining() < payload_len {
            return Err(Error::BufferTooSmall {
                needed: TOKEN_HEADER_SIZE + token_len + PAYLOAD_HEADER_SIZE + payload_len,
                have: TOKEN_HEADER_SIZE + token_len + PAYLOAD_HEADER_SIZE + buf.remaining(),
            });
        }
        let payload = buf.copy_to_bytes(payload_len);

        Ok(Self { token, payload })
    }

    /// Check if buffer contains a complete frame, returning its size
    pub fn check_complete(buf: &[u8]) -> Option<usize> {
        if buf.first() != Some(&COMMAND_SIMPLE) {
            return None;
        }

        let token_len = peek_u16(buf, 1)? as usize;
        let payload_offset = TOKEN_HEADER_SIZE + token_len;
        let payload_len = peek_u16(buf, payload_offset)? as usize;

        let total_size = payload_offset + PAYLOAD_HEADER_SIZE + payload_len;
        if buf.len() >= total_size {
            Some(total_size)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NotificationFrame {
        let payload = Payload::builder().alert("hi").build().unwrap();
        NotificationFrame::from_hex("0a0b0c0d", &payload).unwrap()
    }

    #[test]
    fn test_frame_layout() {
        let encoded = sample().encode().unwrap();
        let json = br#"{"aps":{"alert":"hi"}}"#;

        assert_eq!(encoded[0], COMMAND_SIMPLE);
        assert_eq!(&encoded[1..3], &[0x00, 0x04]);
        assert_eq!(&encoded[3..7], &[0x0a, 0x0b, 0x0c, 0x0d]);
        assert_eq!(&encoded[7..9], &(json.len() as u16).to_be_bytes());
        assert_eq!(&encoded[9..], json);
        assert_eq!(encoded.len(), sample().size());
    }

    #[test]
    fn test_frame_encode_decode() {
        let frame = sample();
        let encoded = frame.encode().unwrap();
        let decoded = NotificationFrame::decode(&encoded[..]).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_invalid_command() {
        let mut encoded = sample().encode().unwrap().to_vec();
        encoded[0] = 0x01;
        assert!(matches!(
            NotificationFrame::decode(&encoded[..]),
            Err(Error::InvalidCommand(0x01))
        ));
    }

    #[test]
    fn test_check_complete() {
        let encoded = sample().encode().unwrap();

        // Complete frame
        assert_eq!(
            NotificationFrame::check_complete(&encoded),
            Some(encoded.len())
        );

        // Incomplete header
        assert_eq!(NotificationFrame::check_complete(&encoded[..2]), None);

        // Incomplete payload
        assert_eq!(
            NotificationFrame::check_complete(&encoded[..encoded.len() - 1]),
            None
        );
    }
}
