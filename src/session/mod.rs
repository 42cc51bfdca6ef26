//! The `session` module owns the broker connection.
//!
//! It wraps the MQTT client with the bridge's lifecycle: authenticated
//! connect, a cancellable receive loop that re-subscribes after every
//! reconnect, and a publish handle for downlink messages that is safe to use
//! from other tasks while the loop runs.

pub mod backoff;
pub mod engine;
pub mod handler;
pub mod state;

pub use engine::{Session, SessionHandle};
pub use handler::{HandlerError, LoggingHandler, UplinkHandler};
pub use state::ConnectionState;

#[cfg(test)]
mod tests;
