//! The `error` module defines the error types used within the `netbridge`
//! application.
//!
//! The taxonomy separates three failure classes with different propagation
//! rules: connection-level failures are fatal to startup, publish failures
//! are returned to the caller of the downlink API, and routing failures are
//! logged and dropped on the receive path.

use thiserror::Error;

/// Errors raised while establishing (or re-authenticating) the broker
/// connection. All of these are fatal: credentials and host are static, so
/// there is no point retrying before the first successful connect.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The broker host could not be reached at the transport level.
    #[error("broker unreachable: {0}")]
    Unreachable(String),

    /// The broker refused the network id / access key pair.
    #[error("broker rejected credentials")]
    AuthRejected,

    /// The broker misbehaved at the protocol level.
    #[error("broker protocol error: {0}")]
    ProtocolError(String),
}

impl ConnectionError {
    /// Classifies a transport-level error from the MQTT client into the
    /// connection taxonomy.
    pub(crate) fn from_transport(err: rumqttc::ConnectionError) -> Self {
        use rumqttc::ConnectReturnCode;

        match err {
            rumqttc::ConnectionError::Io(e) => ConnectionError::Unreachable(e.to_string()),
            rumqttc::ConnectionError::NetworkTimeout => {
                ConnectionError::Unreachable("connection timed out".to_string())
            }
            rumqttc::ConnectionError::ConnectionRefused(
                ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized,
            ) => ConnectionError::AuthRejected,
            other => ConnectionError::ProtocolError(other.to_string()),
        }
    }
}

/// Returns true when a transport error signals a credential rejection, which
/// is the one mid-run failure that must not be retried.
pub(crate) fn is_auth_rejection(err: &rumqttc::ConnectionError) -> bool {
    use rumqttc::ConnectReturnCode;

    matches!(
        err,
        rumqttc::ConnectionError::ConnectionRefused(
            ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized,
        )
    )
}

/// Errors returned to callers of the downlink publish API.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The session is not currently connected; no I/O was performed. The
    /// caller decides whether to retry or drop.
    #[error("not connected to the broker")]
    NotConnected,

    /// The downlink topic could not be built from the given device id.
    #[error("cannot build downlink topic: {0}")]
    InvalidTopic(#[from] RoutingError),

    /// The publish request could not be handed to the MQTT client.
    #[error("publish request rejected: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// Errors raised by topic parsing and construction.
///
/// On the receive path these are logged and the offending message dropped;
/// one unroutable topic must never terminate the receive loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The raw topic does not match `<network>/devices/<device>/<direction>`.
    #[error("malformed topic '{0}'")]
    Malformed(String),

    /// The device id is empty or contains the topic separator.
    #[error("invalid device id '{0}'")]
    InvalidDeviceId(String),

    /// The topic belongs to a different network than this session.
    #[error("topic network '{actual}' does not match session network '{expected}'")]
    NetworkMismatch { expected: String, actual: String },
}
