//! Feedback stream decoding
//!
//! The feedback service writes a sequence of records and then closes the
//! connection:
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Bytes 0-3:    Timestamp (uint32 big-endian, UTC s)   │
//! │ Bytes 4-5:    Token length (uint16 big-endian)       │
//! │ Bytes 6..n:   Token                                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Socket reads split the stream at arbitrary points, so [`FeedbackDecoder`]
//! accumulates chunks and hands out records only once they are complete.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};

use crate::codec::{decode_u32, encode_u32, peek_u16, put_prefixed};
use crate::{DeviceToken, Result};

/// Timestamp plus token length prefix
pub const RECORD_HEADER_SIZE: usize = 6;

/// One expired device token reported by the feedback service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// Seconds since the Unix epoch at which the token stopped being valid
    pub timestamp: u32,
    pub token: DeviceToken,
}

impl FeedbackRecord {
    pub fn new(timestamp: u32, token: DeviceToken) -> Self {
        Self { timestamp, token }
    }

    /// The expiry time in UTC
    pub fn expired_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.timestamp), 0).unwrap_or_default()
    }

    /// Token in hex form
    pub fn token_hex(&self) -> String {
        self.token.to_hex()
    }

    /// Wire size of this record
    pub fn size(&self) -> usize {
        RECORD_HEADER_SIZE + self.token.len()
    }

    /// Encode in the feedback wire format
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_slice(&encode_u32(self.timestamp));
        put_prefixed(&mut buf, self.token.as_bytes());
        buf.freeze()
    }
}

/// Incremental decoder for the feedback stream
#[derive(Debug, Default)]
pub struct FeedbackDecoder {
    buf: BytesMut,
}

impl FeedbackDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with room for `capacity` buffered bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a chunk read from the socket
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete record, if one is buffered
    ///
    /// Returns `Ok(None)` when more data is needed.
    pub fn next_record(&mut self) -> Result<Option<FeedbackRecord>> {
        if self.buf.len() <= RECORD_HEADER_SIZE {
            return Ok(None);
        }

        let token_len = match peek_u16(&self.buf, 4) {
            Some(len) => len as usize,
            None => return Ok(None),
        };
        let record_len = RECORD_HEADER_SIZE + token_len;
        if self.buf.len() < record_len {
            return Ok(None);
        }

        let mut record = self.buf.split_to(record_len);
        let timestamp = decode_u32([record[0], record[1], record[2], record[3]]);
        record.advance(RECORD_HEADER_SIZE);
        let token = DeviceToken::from_bytes(record.freeze())?;

        Ok(Some(FeedbackRecord { timestamp, token }))
    }

    /// Drain every complete record currently buffered
    pub fn drain(&mut self) -> Result<Vec<FeedbackRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of bytes buffered but not yet decoded
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial record
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
