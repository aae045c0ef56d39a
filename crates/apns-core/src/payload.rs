//! Notification payloads
//!
//! The gateway accepts a compact JSON document of at most
//! [`MAX_PAYLOAD_SIZE`](crate::MAX_PAYLOAD_SIZE) bytes:
//!
//! ```text
//! {"aps":{"alert":...,"sound":...,"badge":...},...custom top-level fields}
//! ```
//!
//! A [`Payload`] is encoded once when it is built, so an oversized payload
//! is rejected at construction and never reaches a connection.

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result, APS_KEY, MAX_PAYLOAD_SIZE};

fn is_blank(s: &Option<String>) -> bool {
    s.as_deref().map_or(true, str::is_empty)
}

fn is_empty_args(args: &Option<Vec<String>>) -> bool {
    args.as_ref().map_or(true, Vec::is_empty)
}

/// Structured alert with localisation keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PayloadAlert {
    pub body: String,
    #[serde(rename = "action-loc-key", skip_serializing_if = "is_blank")]
    pub action_loc_key: Option<String>,
    #[serde(rename = "loc-key", skip_serializing_if = "is_blank")]
    pub loc_key: Option<String>,
    #[serde(rename = "loc-args", skip_serializing_if = "is_empty_args")]
    pub loc_args: Option<Vec<String>>,
    #[serde(rename = "launch-image", skip_serializing_if = "is_blank")]
    pub launch_image: Option<String>,
}

impl PayloadAlert {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn action_loc_key(mut self, key: impl Into<String>) -> Self {
        self.action_loc_key = Some(key.into());
        self
    }

    pub fn loc_key(mut self, key: impl Into<String>) -> Self {
        self.loc_key = Some(key.into());
        self
    }

    pub fn loc_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loc_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn launch_image(mut self, image: impl Into<String>) -> Self {
        self.launch_image = Some(image.into());
        self
    }
}

/// Alert content: plain text or a structured object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Alert {
    Text(String),
    Structured(PayloadAlert),
}

impl Alert {
    /// An empty text alert is left out of the document
    fn is_present(&self) -> bool {
        match self {
            Alert::Text(text) => !text.is_empty(),
            Alert::Structured(_) => true,
        }
    }
}

impl From<&str> for Alert {
    fn from(text: &str) -> Self {
        Alert::Text(text.to_string())
    }
}

impl From<String> for Alert {
    fn from(text: String) -> Self {
        Alert::Text(text)
    }
}

impl From<PayloadAlert> for Alert {
    fn from(alert: PayloadAlert) -> Self {
        Alert::Structured(alert)
    }
}

#[derive(Serialize)]
struct Aps<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<u32>,
}

#[derive(Serialize)]
struct Document<'a> {
    aps: Aps<'a>,
    #[serde(flatten)]
    custom: &'a Map<String, Value>,
}

/// A validated notification payload
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    alert: Option<Alert>,
    badge: Option<u32>,
    sound: Option<String>,
    custom: Map<String, Value>,
    encoded: Bytes,
}

impl Payload {
    /// Build a payload and check its encoded size
    ///
    /// Custom fields with an empty key, or keyed `"aps"`, are dropped.
    pub fn new(
        alert: Option<Alert>,
        badge: Option<u32>,
        sound: Option<String>,
        custom: Map<String, Value>,
    ) -> Result<Self> {
        let custom = custom
            .into_iter()
            .filter(|(key, _)| is_custom_key(key))
            .collect();

        let mut payload = Self {
            alert,
            badge,
            sound,
            custom,
            encoded: Bytes::new(),
        };

        let encoded = serde_json::to_vec(&payload.document())?;
        if encoded.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: encoded.len(),
            });
        }
        payload.encoded = Bytes::from(encoded);
        Ok(payload)
    }

    /// Create a builder
    pub fn builder() -> PayloadBuilder {
        PayloadBuilder::default()
    }

    fn document(&self) -> Document<'_> {
        Document {
            aps: Aps {
                alert: self.alert.as_ref().filter(|a| a.is_present()),
                sound: self.sound.as_deref().filter(|s| !s.is_empty()),
                badge: self.badge,
            },
            custom: &self.custom,
        }
    }

    /// Compact UTF-8 JSON bytes, as sent to the gateway
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// The payload as a JSON document
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.document())?)
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn badge(&self) -> Option<u32> {
        self.badge
    }

    pub fn sound(&self) -> Option<&str> {
        self.sound.as_deref()
    }

    pub fn custom(&self) -> &Map<String, Value> {
        &self.custom
    }
}

fn is_custom_key(key: &str) -> bool {
    !key.is_empty() && key != APS_KEY
}

/// Builder for [`Payload`]
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    alert: Option<Alert>,
    badge: Option<u32>,
    sound: Option<String>,
    custom: Map<String, Value>,
}

impl PayloadBuilder {
    /// Set the alert (text or [`PayloadAlert`])
    pub fn alert(mut self, alert: impl Into<Alert>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    /// Set the badge count; zero is sent and clears the badge
    pub fn badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Set the sound name
    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Add a custom top-level field; later values for a key win
    pub fn custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Encode and validate
    pub fn build(self) -> Result<Payload> {
        Payload::new(self.alert, self.badge, self.sound, self.custom)
    }
}
