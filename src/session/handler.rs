use tracing::info;

use crate::router::InboundMessage;

/// Error type handlers may return; the receive loop logs it and drops the
/// message.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Ingestion callback for uplink messages.
///
/// The receive loop invokes the handler once per validated inbound message.
/// A handler failure never terminates the loop; it is logged and the message
/// dropped, so downstream outages cannot take the broker connection down
/// with them.
pub trait UplinkHandler: Send {
    fn handle(&mut self, message: InboundMessage) -> Result<(), HandlerError>;
}

impl<F> UplinkHandler for F
where
    F: FnMut(InboundMessage) -> Result<(), HandlerError> + Send,
{
    fn handle(&mut self, message: InboundMessage) -> Result<(), HandlerError> {
        self(message)
    }
}

/// Handler that logs every uplink message and discards it.
///
/// This is the default behavior of the bridge binary when no processing
/// service is wired in.
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl UplinkHandler for LoggingHandler {
    fn handle(&mut self, message: InboundMessage) -> Result<(), HandlerError> {
        info!(
            device = %message.device_id,
            topic = %message.topic,
            bytes = message.payload.len(),
            "uplink message received"
        );
        Ok(())
    }
}
