//! # NetBridge
//!
//! `netbridge` is a bidirectional bridge between a wide-area IoT network's
//! MQTT broker and an internal processing platform. It keeps one persistent,
//! authenticated broker connection open, subscribes to the uplink topics of a
//! configured device set, and hands every received message to an ingestion
//! callback. Downlink messages travel the other way: callers publish them to
//! a specific device through the same connection.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `config`: Handles loading and merging bridge configuration from files and environment.
//! - `router`: Pure translation between domain messages and broker topic strings.
//! - `session`: The broker session: connection lifecycle, receive loop, subscribe/publish.
//! - `utils`: Shared utilities, such as error types and logging setup.

pub mod config;
pub mod router;
pub mod session;
pub mod utils;
