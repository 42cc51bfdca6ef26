use std::fmt;

use chrono::Utc;

use crate::router::message::InboundMessage;
use crate::utils::error::RoutingError;

/// Separator between topic segments.
pub const SEPARATOR: char = '/';

/// Literal second segment of every device topic.
const DEVICES_SEGMENT: &str = "devices";

/// Direction of a message relative to the processing platform.
///
/// `Up` is device-to-platform (uplink), `Down` is platform-to-device
/// (downlink). The wire literals are `"up"` and `"down"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated device topic.
///
/// Serializes to the wire form `<networkId>/devices/<deviceId>/<direction>`.
/// A `Topic` is only ever constructed by [`TopicRouter`], so holding one
/// implies the segments were validated against the session's network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub network_id: String,
    pub device_id: String,
    pub direction: Direction,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{net}{sep}{devices}{sep}{dev}{sep}{dir}",
            net = self.network_id,
            sep = SEPARATOR,
            devices = DEVICES_SEGMENT,
            dev = self.device_id,
            dir = self.direction,
        )
    }
}

/// Builds and parses topics for one network.
///
/// The network id is injected at construction and never read back out of a
/// topic string, so messages from another network can never be attributed to
/// this session's network.
#[derive(Debug, Clone)]
pub struct TopicRouter {
    network_id: String,
}

impl TopicRouter {
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Builds the uplink subscription filter
    /// `<networkId>/devices/<deviceFilter>/up`.
    ///
    /// `device_filter` may be a broker wildcard such as `+`; the
    /// configuration layer guarantees it is non-empty.
    pub fn uplink_filter(&self, device_filter: &str) -> String {
        format!(
            "{net}{sep}{devices}{sep}{filter}{sep}{dir}",
            net = self.network_id,
            sep = SEPARATOR,
            devices = DEVICES_SEGMENT,
            filter = device_filter,
            dir = Direction::Up,
        )
    }

    /// Builds the downlink publish topic `<networkId>/devices/<deviceId>/down`.
    ///
    /// The device id must be non-empty and must not contain the topic
    /// separator, otherwise a single publish could address an unintended
    /// topic subtree.
    pub fn downlink_topic(&self, device_id: &str) -> Result<Topic, RoutingError> {
        if device_id.is_empty() || device_id.contains(SEPARATOR) {
            return Err(RoutingError::InvalidDeviceId(device_id.to_string()));
        }

        Ok(Topic {
            network_id: self.network_id.clone(),
            device_id: device_id.to_string(),
            direction: Direction::Down,
        })
    }

    /// Parses a raw topic string received from the broker.
    ///
    /// Expects exactly four segments, the literal `devices` second, a
    /// non-empty device id, and a known direction. The leading segment must
    /// equal this router's network id.
    pub fn parse(&self, raw: &str) -> Result<Topic, RoutingError> {
        let segments: Vec<&str> = raw.split(SEPARATOR).collect();

        let &[network_id, devices, device_id, direction] = segments.as_slice() else {
            return Err(RoutingError::Malformed(raw.to_string()));
        };

        if devices != DEVICES_SEGMENT || network_id.is_empty() || device_id.is_empty() {
            return Err(RoutingError::Malformed(raw.to_string()));
        }

        let Some(direction) = Direction::parse(direction) else {
            return Err(RoutingError::Malformed(raw.to_string()));
        };

        if network_id != self.network_id {
            return Err(RoutingError::NetworkMismatch {
                expected: self.network_id.clone(),
                actual: network_id.to_string(),
            });
        }

        Ok(Topic {
            network_id: network_id.to_string(),
            device_id: device_id.to_string(),
            direction,
        })
    }

    /// Wraps a validated topic and its payload into an [`InboundMessage`],
    /// stamping the arrival time.
    pub fn to_inbound(&self, topic: Topic, payload: Vec<u8>) -> InboundMessage {
        InboundMessage {
            device_id: topic.device_id.clone(),
            payload,
            topic,
            received_at: Utc::now(),
        }
    }
}
