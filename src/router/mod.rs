//! The `router` module translates between domain concepts (network id,
//! device id, direction) and broker topic strings.
//!
//! It is pure and side-effect free: the session delegates to it for building
//! the uplink subscription filter, for formatting downlink publish topics,
//! and for parsing the topic of every received frame before the message is
//! handed to the ingestion callback.

pub mod message;
pub mod topic;

pub use message::{InboundMessage, OutboundMessage};
pub use topic::{Direction, Topic, TopicRouter};
