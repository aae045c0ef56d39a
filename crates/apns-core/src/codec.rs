//! Network byte order helpers
//!
//! Fixed-width unsigned integers as they appear on the gateway and
//! feedback wires: most significant byte first. Decoders take exactly
//! sized arrays so the caller proves the length up front.

use bytes::BufMut;

/// Encode a u16 in network byte order
#[inline]
pub fn encode_u16(n: u16) -> [u8; 2] {
    n.to_be_bytes()
}

/// Decode a u16 from network byte order
#[inline]
pub fn decode_u16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Encode a u32 in network byte order
#[inline]
pub fn encode_u32(n: u32) -> [u8; 4] {
    n.to_be_bytes()
}

/// Decode a u32 from network byte order
#[inline]
pub fn decode_u32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Read a big-endian u16 at `offset`, if the slice is long enough
#[inline]
pub fn peek_u16(buf: &[u8], offset: usize) -> Option<u16> {
    let bytes = buf.get(offset..offset + 2)?;
    Some(decode_u16([bytes[0], bytes[1]]))
}

/// Read a big-endian u32 at `offset`, if the slice is long enough
#[inline]
pub fn peek_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset + 4)?;
    Some(decode_u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Append a 16-bit length prefix followed by `data`
///
/// Callers check `data.len() <= u16::MAX` beforehand.
#[inline]
pub(crate) fn put_prefixed(buf: &mut impl BufMut, data: &[u8]) {
    buf.put_slice(&encode_u16(data.len() as u16));
    buf.put_slice(data);
}
