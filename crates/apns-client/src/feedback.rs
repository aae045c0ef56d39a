//! Feedback client: reads expired device tokens
//!
//! The feedback service sends every queued record as soon as a client
//! connects and then closes the connection. Records are removed from the
//! server's queue once delivered, so a second pass over a fresh connection
//! yields only records queued since.

use apns_core::{FeedbackDecoder, FeedbackRecord};
use apns_transport::{ConnectionConfig, Connector, Endpoint, SecureConnection, TlsConnector};
use futures::Stream;
use tracing::debug;

use crate::config::ApnsConfig;
use crate::error::Result;
use crate::FEEDBACK_CHUNK_SIZE;

/// Connection to the feedback service
pub struct FeedbackClient<C: Connector = TlsConnector> {
    conn: SecureConnection<C>,
}

impl FeedbackClient<TlsConnector> {
    /// Create a TLS feedback client from service configuration
    pub fn new(config: &ApnsConfig) -> Self {
        Self::with_connector(
            TlsConnector::new(config.tls_config()),
            config.feedback_endpoint(),
            config.connection.clone(),
        )
    }
}

impl<C: Connector> FeedbackClient<C> {
    pub fn with_connector(connector: C, endpoint: Endpoint, config: ConnectionConfig) -> Self {
        Self {
            conn: SecureConnection::new(connector, endpoint, config),
        }
    }

    /// Start a single pass over the records the service has queued
    pub fn records(&mut self) -> FeedbackRecords<'_, C> {
        FeedbackRecords {
            conn: &mut self.conn,
            decoder: FeedbackDecoder::with_capacity(FEEDBACK_CHUNK_SIZE),
            received: 0,
            started: false,
            done: false,
        }
    }

    /// Read every queued record
    pub async fn fetch_all(&mut self) -> Result<Vec<FeedbackRecord>> {
        let mut records = self.records();
        let mut out = Vec::new();
        while let Some(record) = records.next().await? {
            out.push(record);
        }
        Ok(out)
    }

    pub fn connection(&self) -> &SecureConnection<C> {
        &self.conn
    }

    pub async fn close(&mut self) {
        self.conn.disconnect().await;
    }
}

/// Pull-based, single-pass sequence of feedback records
///
/// Every pass starts on a new connection: a stream left open by an earlier,
/// abandoned pass is closed first. Reads [`FEEDBACK_CHUNK_SIZE`] bytes at a
/// time and hands out every record completed so far before reading again.
/// The sequence ends when the service closes the stream; a trailing partial
/// record is discarded.
pub struct FeedbackRecords<'a, C: Connector> {
    conn: &'a mut SecureConnection<C>,
    decoder: FeedbackDecoder,
    received: usize,
    started: bool,
    done: bool,
}

impl<'a, C: Connector> FeedbackRecords<'a, C> {
    /// Next record, or `None` once the service has closed the stream
    pub async fn next(&mut self) -> Result<Option<FeedbackRecord>> {
        loop {
            if self.done {
                return Ok(None);
            }

            if !self.started {
                self.started = true;
                if self.conn.is_connected() {
                    debug!("Closing stream left open by an earlier feedback pass");
                    self.conn.disconnect().await;
                }
            }

            if let Some(record) = self.decoder.next_record()? {
                self.received += 1;
                return Ok(Some(record));
            }

            let chunk = match self.conn.read(FEEDBACK_CHUNK_SIZE).await {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            };

            if chunk.is_empty() {
                self.finish().await;
                return Ok(None);
            }

            self.decoder.push(&chunk);
        }
    }

    /// Records handed out so far
    pub fn received(&self) -> usize {
        self.received
    }

    async fn finish(&mut self) {
        self.done = true;
        if self.decoder.buffered() > 0 {
            debug!(
                "Discarding {} trailing feedback bytes",
                self.decoder.buffered()
            );
            self.decoder.clear();
        }
        debug!("Feedback stream ended after {} records", self.received);
        // The service is done with this connection; the next pass reconnects
        self.conn.disconnect().await;
    }

    /// Adapt into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Result<FeedbackRecord>> + 'a {
        futures::stream::try_unfold(self, |mut records| async move {
            Ok(records.next().await?.map(|record| (record, records)))
        })
    }
}
