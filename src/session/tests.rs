use std::time::Duration;

use rumqttc::{ConnAck, ConnectReturnCode, Event, Packet, Publish, QoS, SubAck};

use super::backoff::Backoff;
use super::engine::{Action, Session};
use super::state::ConnectionState;
use crate::config::{BrokerSettings, LogSettings, NetworkSettings, Settings};
use crate::router::{InboundMessage, OutboundMessage};
use crate::session::handler::HandlerError;
use crate::utils::error::PublishError;

fn test_settings() -> Settings {
    Settings {
        network: NetworkSettings {
            id: "lora-fing".to_string(),
            access_key: "test-key".to_string(),
            device_filter: "+".to_string(),
        },
        broker: BrokerSettings {
            host: "localhost".to_string(),
            port: 1883,
            keepalive_secs: 60,
        },
        log: LogSettings {
            level: "info".to_string(),
        },
    }
}

fn connack(code: ConnectReturnCode) -> Event {
    Event::Incoming(Packet::ConnAck(ConnAck {
        session_present: false,
        code,
    }))
}

fn uplink(topic: &str, payload: &[u8]) -> Event {
    Event::Incoming(Packet::Publish(Publish::new(
        topic,
        QoS::AtMostOnce,
        payload.to_vec(),
    )))
}

fn drop_handler() -> impl FnMut(InboundMessage) -> Result<(), HandlerError> + Send {
    |_message| Ok(())
}

#[test]
fn test_state_can_publish() {
    assert!(!ConnectionState::Disconnected.can_publish());
    assert!(!ConnectionState::Connecting.can_publish());
    assert!(ConnectionState::Connected.can_publish());
    assert!(ConnectionState::Subscribed.can_publish());
    assert!(!ConnectionState::Failed.can_publish());
}

#[test]
fn test_assemble_starts_disconnected() {
    let session = Session::assemble(&test_settings());
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(session.uplink_filter, "lora-fing/devices/+/up");
}

#[test]
fn test_connack_success_requests_subscription() {
    let session = Session::assemble(&test_settings());
    let mut handler = drop_handler();

    let action = session.on_event(connack(ConnectReturnCode::Success), &mut handler);

    assert!(matches!(action, Action::Subscribe(filter) if filter == "lora-fing/devices/+/up"));
    assert_eq!(session.state(), ConnectionState::Connected);
}

#[test]
fn test_reconnect_connack_reissues_same_subscription() {
    let session = Session::assemble(&test_settings());
    let mut handler = drop_handler();

    // First connect, then a broker-side disconnect, then the reconnect ack.
    let first = session.on_event(connack(ConnectReturnCode::Success), &mut handler);
    session.on_event(Event::Incoming(Packet::Disconnect), &mut handler);
    assert_eq!(session.state(), ConnectionState::Connecting);
    let second = session.on_event(connack(ConnectReturnCode::Success), &mut handler);

    let Action::Subscribe(first) = first else {
        panic!("expected subscribe action");
    };
    let Action::Subscribe(second) = second else {
        panic!("expected subscribe action");
    };
    // One subscription per acknowledgement, always for the same filter.
    assert_eq!(first, second);
}

#[test]
fn test_suback_marks_subscribed() {
    let session = Session::assemble(&test_settings());
    let mut handler = drop_handler();

    session.on_event(connack(ConnectReturnCode::Success), &mut handler);
    let action = session.on_event(
        Event::Incoming(Packet::SubAck(SubAck::new(1, Vec::new()))),
        &mut handler,
    );

    assert!(matches!(action, Action::Continue));
    assert_eq!(session.state(), ConnectionState::Subscribed);
}

#[test]
fn test_connack_bad_credentials_is_fatal() {
    let session = Session::assemble(&test_settings());
    let mut handler = drop_handler();

    let action = session.on_event(connack(ConnectReturnCode::BadUserNamePassword), &mut handler);

    assert!(matches!(
        action,
        Action::Fatal(crate::utils::error::ConnectionError::AuthRejected)
    ));
}

#[test]
fn test_uplink_message_reaches_handler() {
    let session = Session::assemble(&test_settings());
    let mut seen: Vec<InboundMessage> = Vec::new();
    let mut handler = |message: InboundMessage| -> Result<(), HandlerError> {
        seen.push(message);
        Ok(())
    };

    session.on_event(uplink("lora-fing/devices/sensor1/up", b"\x2a"), &mut handler);

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].device_id, "sensor1");
    assert_eq!(seen[0].payload, vec![0x2a]);
}

#[test]
fn test_malformed_topic_does_not_block_later_messages() {
    let session = Session::assemble(&test_settings());
    let mut seen: Vec<String> = Vec::new();
    let mut handler = |message: InboundMessage| -> Result<(), HandlerError> {
        seen.push(message.device_id);
        Ok(())
    };

    session.on_event(uplink("malformed/topic", b"bad"), &mut handler);
    session.on_event(uplink("other-net/devices/sensor9/up", b"foreign"), &mut handler);
    session.on_event(uplink("lora-fing/devices/sensor1/up", b"good"), &mut handler);

    assert_eq!(seen, vec!["sensor1".to_string()]);
}

#[test]
fn test_non_uplink_direction_is_ignored() {
    let session = Session::assemble(&test_settings());
    let mut seen = 0usize;
    let mut handler = |_message: InboundMessage| -> Result<(), HandlerError> {
        seen += 1;
        Ok(())
    };

    session.on_event(uplink("lora-fing/devices/sensor1/down", b"echo"), &mut handler);

    assert_eq!(seen, 0);
}

#[test]
fn test_handler_failure_does_not_stop_dispatch() {
    let session = Session::assemble(&test_settings());
    let mut delivered: Vec<String> = Vec::new();
    let mut calls = 0usize;
    let mut handler = |message: InboundMessage| -> Result<(), HandlerError> {
        calls += 1;
        if calls == 1 {
            return Err("downstream unavailable".into());
        }
        delivered.push(message.device_id);
        Ok(())
    };

    session.on_event(uplink("lora-fing/devices/sensor1/up", b"one"), &mut handler);
    session.on_event(uplink("lora-fing/devices/sensor2/up", b"two"), &mut handler);

    assert_eq!(calls, 2);
    assert_eq!(delivered, vec!["sensor2".to_string()]);
}

#[tokio::test]
async fn test_publish_fails_without_connection() {
    let session = Session::assemble(&test_settings());
    let handle = session.handle();

    let result = handle.publish(OutboundMessage::new("sensor1", b"off".to_vec())).await;

    assert!(matches!(result, Err(PublishError::NotConnected)));
}

#[tokio::test]
async fn test_publish_rejects_bad_device_id() {
    let session = Session::assemble(&test_settings());
    session.set_state(ConnectionState::Connected);
    let handle = session.handle();

    let result = handle.publish(OutboundMessage::new("bad/id", b"off".to_vec())).await;

    assert!(matches!(result, Err(PublishError::InvalidTopic(_))));
}

#[tokio::test]
async fn test_publish_enqueues_when_connected() {
    let session = Session::assemble(&test_settings());
    session.set_state(ConnectionState::Connected);
    let handle = session.handle();

    // The request lands in the client's channel; no broker needed.
    handle
        .publish(OutboundMessage::new("sensor1", b"off".to_vec()))
        .await
        .unwrap();
}

#[test]
fn test_backoff_grows_and_caps() {
    let mut backoff = Backoff::new(Duration::from_millis(500), 2.0, Duration::from_secs(4));

    assert_eq!(backoff.next_delay(), Duration::from_millis(500));
    assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    assert_eq!(backoff.next_delay(), Duration::from_secs(4));
    // Capped from here on.
    assert_eq!(backoff.next_delay(), Duration::from_secs(4));
}

#[test]
fn test_backoff_reset() {
    let mut backoff = Backoff::new(Duration::from_millis(500), 2.0, Duration::from_secs(4));
    backoff.next_delay();
    backoff.next_delay();
    backoff.reset();
    assert_eq!(backoff.next_delay(), Duration::from_millis(500));
}
