//! APNs Client Library
//!
//! Async clients for the binary Apple Push Notification service.
//!
//! # Example
//!
//! ```ignore
//! use apns_client::Apns;
//! use apns_core::Payload;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut apns = Apns::builder("cert.pem").key_file("key.pem").sandbox(true).build();
//!
//!     let payload = Payload::builder().alert("Hello!").badge(1).build()?;
//!     apns.gateway().send("b5bb9d80...", &payload).await?;
//!
//!     let mut records = apns.feedback().records();
//!     while let Some(record) = records.next().await? {
//!         println!("{} expired at {}", record.token_hex(), record.expired_at());
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod feedback;
pub mod gateway;
pub mod service;

pub use builder::ApnsBuilder;
pub use config::ApnsConfig;
pub use error::{ClientError, Result};
pub use feedback::{FeedbackClient, FeedbackRecords};
pub use gateway::GatewayClient;
pub use service::Apns;

/// Bytes requested per feedback read
pub const FEEDBACK_CHUNK_SIZE: usize = 4096;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::ApnsBuilder;
    pub use crate::error::{ClientError, Result};
    pub use crate::service::Apns;
    pub use apns_core::{Alert, DeviceToken, FeedbackRecord, Payload, PayloadAlert};
}
