use chrono::{DateTime, Utc};

use crate::router::topic::Topic;

/// An uplink message received from a device.
///
/// Constructed per received frame and handed straight to the ingestion
/// callback; the bridge does not retain it. The payload is opaque — decoding
/// is the downstream collaborator's concern.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Device that sent the message, taken from the validated topic.
    pub device_id: String,

    /// Raw payload bytes, uninterpreted.
    pub payload: Vec<u8>,

    /// The validated topic the message arrived on.
    pub topic: Topic,

    /// When the bridge received the frame.
    pub received_at: DateTime<Utc>,
}

/// A downlink message to be published to one device.
///
/// Constructed by the caller of the publish API and consumed immediately.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub device_id: String,
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    pub fn new(device_id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            device_id: device_id.into(),
            payload: payload.into(),
        }
    }
}
