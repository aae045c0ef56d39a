//! Connection lifecycle tests
//!
//! - Lazy connect on first use
//! - Teardown on write failure and transparent reconnect
//! - Timed reads
//! - Pre-write liveness check

use apns_test_utils::{next_peer, DuplexConnector};
use apns_transport::{ConnectionConfig, Endpoint, ReadOutcome, SecureConnection, TransportError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn endpoint() -> Endpoint {
    Endpoint::new("gateway.sandbox.push.apple.com", 2195)
}

fn checking() -> ConnectionConfig {
    ConnectionConfig::default()
        .with_check_closed_socket(true)
        .with_check_closed_timeout(Duration::from_millis(50))
}

#[tokio::test]
async fn test_connects_on_first_write() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector.clone(), endpoint(), Default::default());

    assert_eq!(connector.connects(), 0);
    assert!(!conn.is_connected());

    conn.write(b"frame").await.expect("write failed");
    assert_eq!(connector.connects(), 1);

    let mut peer = next_peer(&mut peers).await;
    assert_eq!(peer.endpoint, endpoint());
    let mut buf = [0u8; 5];
    peer.stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"frame");

    // Same stream for the second write
    conn.write(b"again").await.expect("write failed");
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn test_write_failure_reconnects() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector.clone(), endpoint(), Default::default());

    conn.connect().await.unwrap();
    drop(next_peer(&mut peers).await);

    let err = conn.write(b"lost").await.unwrap_err();
    assert!(matches!(err, TransportError::Io(_)), "unexpected: {err}");
    assert!(!conn.is_connected());

    conn.write(b"retry").await.expect("reconnect failed");
    assert!(conn.is_connected());
    assert_eq!(connector.connects(), 2);

    let mut peer = next_peer(&mut peers).await;
    let mut buf = [0u8; 5];
    peer.stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"retry");
}

#[tokio::test]
async fn test_connect_failure_stays_disconnected() {
    let (connector, peers) = DuplexConnector::new();
    drop(peers);
    let mut conn = SecureConnection::new(connector, endpoint(), Default::default());

    let err = conn.write(b"x").await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionFailed(_)));
    assert!(!conn.is_connected());
}

#[tokio::test]
async fn test_read_timeout_keeps_connection() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector.clone(), endpoint(), Default::default());

    let outcome = conn.read_timeout(16, Duration::from_millis(20)).await;
    assert_eq!(outcome, ReadOutcome::TimedOut);
    assert!(conn.is_connected());

    let mut peer = next_peer(&mut peers).await;
    peer.stream.write_all(b"late").await.unwrap();

    let outcome = conn.read_timeout(16, Duration::from_secs(1)).await;
    assert_eq!(outcome, ReadOutcome::Data("late".into()));
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn test_read_timeout_connect_failure_is_no_data() {
    let (connector, peers) = DuplexConnector::new();
    drop(peers);
    let mut conn = SecureConnection::new(connector, endpoint(), Default::default());

    let outcome = conn.read_timeout(1, Duration::from_millis(20)).await;
    assert_eq!(outcome, ReadOutcome::NoData);
}

#[tokio::test]
async fn test_read_returns_at_most_max_bytes() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector, endpoint(), Default::default());
    conn.connect().await.unwrap();

    let mut peer = next_peer(&mut peers).await;
    peer.stream.write_all(b"0123456789").await.unwrap();

    let first = conn.read(4).await.unwrap();
    assert_eq!(&first[..], b"0123");
    let rest = conn.read(64).await.unwrap();
    assert_eq!(&rest[..], b"456789");

    drop(peer);
    assert!(conn.read(64).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_check_allows_write_on_quiet_connection() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector.clone(), endpoint(), checking());

    conn.write(b"ok").await.expect("write failed");

    let mut peer = next_peer(&mut peers).await;
    let mut buf = [0u8; 2];
    peer.stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ok");
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn test_check_detects_unexpected_data() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector.clone(), endpoint(), checking());

    conn.connect().await.unwrap();
    let mut peer = next_peer(&mut peers).await;
    peer.stream.write_all(&[0x08, 0x08]).await.unwrap();

    let err = conn.write(b"frame").await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed));
    assert!(!conn.is_connected());

    // Next write gets a fresh connection
    conn.write(b"frame").await.expect("write failed");
    assert_eq!(connector.connects(), 2);
}

#[tokio::test]
async fn test_check_detects_peer_close() {
    let (connector, mut peers) = DuplexConnector::new();
    let mut conn = SecureConnection::new(connector, endpoint(), checking());

    conn.connect().await.unwrap();
    drop(next_peer(&mut peers).await);

    let err = conn.write(b"frame").await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed));
    assert!(!conn.is_connected());
}

#[tokio::test]
async fn test_connect_failure_surfaces_with_check_enabled() {
    let (connector, peers) = DuplexConnector::new();
    drop(peers);
    let mut conn = SecureConnection::new(connector, endpoint(), checking());

    let err = conn.write(b"frame").await.unwrap_err();
    assert!(
        matches!(err, TransportError::ConnectionFailed(_)),
        "unexpected: {err}"
    );
    assert!(!conn.is_connected());
}
