//! Common test helpers for APNs tests
//!
//! This crate provides:
//! - An in-memory connector whose peers are handed to the test
//! - Feedback stream fixtures

use apns_core::{DeviceToken, FeedbackRecord};
use apns_transport::{Connector, Endpoint, Result, TransportError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tracing::debug;

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffer size of each in-memory pipe
pub const DUPLEX_BUFFER_SIZE: usize = 64 * 1024;

// ============================================================================
// In-memory connector
// ============================================================================

/// The server side of one in-memory connection
#[derive(Debug)]
pub struct Peer {
    /// Endpoint the client asked for
    pub endpoint: Endpoint,
    pub stream: DuplexStream,
}

/// Connector backed by `tokio::io::duplex`
///
/// Every successful connect sends the other half of the pipe through the
/// channel returned by [`DuplexConnector::new`]. Dropping that half makes
/// client writes fail with `BrokenPipe` and client reads return EOF.
#[derive(Debug, Clone)]
pub struct DuplexConnector {
    peers: mpsc::UnboundedSender<Peer>,
    connects: Arc<AtomicUsize>,
}

impl DuplexConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Peer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            peers: tx,
            connects: Arc::new(AtomicUsize::new(0)),
        };
        (connector, rx)
    }

    /// Number of successful connects so far
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for DuplexConnector {
    type Stream = DuplexStream;

    async fn connect(&self, endpoint: &Endpoint) -> Result<DuplexStream> {
        let (client, server) = tokio::io::duplex(DUPLEX_BUFFER_SIZE);
        self.peers
            .send(Peer {
                endpoint: endpoint.clone(),
                stream: server,
            })
            .map_err(|_| TransportError::ConnectionFailed(format!("{endpoint}: refused")))?;

        let n = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Duplex connect #{} to {}", n, endpoint);
        Ok(client)
    }
}

/// Wait for the next peer, panicking after [`DEFAULT_TIMEOUT`]
pub async fn next_peer(peers: &mut mpsc::UnboundedReceiver<Peer>) -> Peer {
    tokio::time::timeout(DEFAULT_TIMEOUT, peers.recv())
        .await
        .expect("timed out waiting for a connection")
        .expect("connector dropped")
}

// ============================================================================
// Feedback fixtures
// ============================================================================

/// `n` records with timestamp `1_000_000_000 + i` and a 16-byte token of value `i`
pub fn sample_records(n: usize) -> Vec<FeedbackRecord> {
    (0..n)
        .map(|i| {
            let token = DeviceToken::from_bytes(vec![i as u8; 16]).expect("16-byte token");
            FeedbackRecord::new(1_000_000_000 + i as u32, token)
        })
        .collect()
}

/// Concatenate records in the feedback wire format
pub fn encode_feedback_stream(records: &[FeedbackRecord]) -> Bytes {
    let mut buf = BytesMut::new();
    for record in records {
        buf.extend_from_slice(&record.encode());
    }
    buf.freeze()
}

/// Split `data` into chunks of the given sizes, cycling through `sizes`
pub fn split_chunks(data: &[u8], sizes: &[usize]) -> Vec<Bytes> {
    assert!(sizes.iter().all(|s| *s > 0), "chunk sizes must be positive");
    let mut chunks = Vec::new();
    let mut offset = 0;
    for size in sizes.iter().cycle() {
        if offset >= data.len() {
            break;
        }
        let end = (offset + size).min(data.len());
        chunks.push(Bytes::copy_from_slice(&data[offset..end]));
        offset = end;
    }
    chunks
}
