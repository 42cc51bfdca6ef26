use std::fmt;

/// Lifecycle state of the broker session.
///
/// Transitions are driven by broker acknowledgements and transport errors:
/// `Disconnected` → `Connecting` → `Connected` → `Subscribed`, back to
/// `Connecting` on a transport drop, and `Failed` terminally when the broker
/// rejects the credentials after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Subscribed,
    Failed,
}

impl ConnectionState {
    /// Publishing is only valid once the broker has acknowledged the
    /// connection.
    pub fn can_publish(self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Subscribed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Subscribed => "subscribed",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}
