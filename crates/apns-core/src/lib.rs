//! APNs Core
//!
//! Wire types and encoding for the binary Apple Push Notification service.
//!
//! This crate provides:
//! - Network byte order helpers ([`codec`])
//! - Device tokens ([`DeviceToken`])
//! - Notification payloads with size validation ([`Payload`], [`PayloadAlert`])
//! - Gateway notification framing ([`NotificationFrame`])
//! - Incremental feedback stream decoding ([`FeedbackDecoder`], [`FeedbackRecord`])
//!
//! Nothing in here performs I/O; see `apns-transport` and `apns-client`.

pub mod codec;
pub mod error;
pub mod feedback;
pub mod frame;
pub mod payload;
pub mod token;

pub use error::{Error, Result};
pub use feedback::{FeedbackDecoder, FeedbackRecord};
pub use frame::NotificationFrame;
pub use payload::{Alert, Payload, PayloadAlert, PayloadBuilder};
pub use token::DeviceToken;

/// Maximum encoded payload size accepted by the gateway
pub const MAX_PAYLOAD_SIZE: usize = 256;

/// Command byte of the simple notification format
pub const COMMAND_SIMPLE: u8 = 0;

/// Top-level key the notification fields are nested under
pub const APS_KEY: &str = "aps";

/// Gateway port (notifications)
pub const GATEWAY_PORT: u16 = 2195;

/// Feedback port (expired tokens)
pub const FEEDBACK_PORT: u16 = 2196;

/// Production gateway host
pub const GATEWAY_HOST: &str = "gateway.push.apple.com";

/// Sandbox gateway host
pub const GATEWAY_SANDBOX_HOST: &str = "gateway.sandbox.push.apple.com";

/// Production feedback host
pub const FEEDBACK_HOST: &str = "feedback.push.apple.com";

/// Sandbox feedback host
pub const FEEDBACK_SANDBOX_HOST: &str = "feedback.sandbox.push.apple.com";
