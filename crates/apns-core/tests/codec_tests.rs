//! Byte order helper tests for APNs core

use apns_core::codec::{decode_u16, decode_u32, encode_u16, encode_u32};

#[test]
fn test_u16_bounds() {
    assert_eq!(decode_u16(encode_u16(0)), 0);
    assert_eq!(decode_u16(encode_u16(65535)), 65535);
    assert_eq!(encode_u16(65535), [0xFF, 0xFF]);
}

#[test]
fn test_u32_bounds() {
    assert_eq!(decode_u32(encode_u32(0)), 0);
    assert_eq!(decode_u32(encode_u32(4_294_967_295)), 4_294_967_295);
    assert_eq!(encode_u32(4_294_967_295), [0xFF; 4]);
}

#[test]
fn test_network_order() {
    assert_eq!(encode_u16(256), [0x01, 0x00]);
    assert_eq!(encode_u32(256), [0x00, 0x00, 0x01, 0x00]);
}
