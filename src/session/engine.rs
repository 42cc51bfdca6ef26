use std::sync::{Arc, RwLock};
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, Publish, QoS};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::router::{Direction, OutboundMessage, TopicRouter};
use crate::session::backoff::Backoff;
use crate::session::handler::UplinkHandler;
use crate::session::state::ConnectionState;
use crate::utils::error::{is_auth_rejection, ConnectionError, PublishError};

/// Capacity of the MQTT client's request channel. Publishes from other tasks
/// queue here and are written to the transport by the event loop, which is
/// the single writer.
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// The network delivers uplinks at most once; downlinks use the same level.
const QOS: QoS = QoS::AtMostOnce;

/// What the receive loop must do after handling one event.
#[derive(Debug)]
pub(crate) enum Action {
    /// Issue (or re-issue, after a reconnect) the uplink subscription.
    Subscribe(String),
    /// Non-retryable failure; tear the session down.
    Fatal(ConnectionError),
    /// Nothing to do.
    Continue,
}

/// One authenticated, long-lived session with the network's broker.
///
/// Created by [`Session::connect`]; [`Session::run`] then consumes it as the
/// receive loop. Downlink publishing goes through a [`SessionHandle`] cloned
/// off before `run` is called.
pub struct Session {
    pub(crate) client: AsyncClient,
    pub(crate) eventloop: EventLoop,
    pub(crate) router: TopicRouter,
    pub(crate) state: Arc<RwLock<ConnectionState>>,
    pub(crate) uplink_filter: String,
}

impl Session {
    /// Builds the client and event loop without touching the network.
    pub(crate) fn assemble(settings: &Settings) -> Self {
        let client_id = format!("netbridge-{}", Uuid::new_v4());
        let mut options = MqttOptions::new(
            client_id,
            settings.broker.host.clone(),
            settings.broker.port,
        );
        options.set_credentials(
            settings.network.id.clone(),
            settings.network.access_key.clone(),
        );
        options.set_keep_alive(Duration::from_secs(settings.broker.keepalive_secs));

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        let router = TopicRouter::new(settings.network.id.clone());
        let uplink_filter = router.uplink_filter(&settings.network.device_filter);

        Self {
            client,
            eventloop,
            router,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            uplink_filter,
        }
    }

    /// Connects to the broker and waits for its acknowledgement.
    ///
    /// The network id is the broker username, the access key the password.
    /// Any failure here is fatal to startup: the credentials and host are
    /// static, so there is nothing to gain from retrying before the first
    /// successful connect.
    pub async fn connect(settings: &Settings) -> Result<Self, ConnectionError> {
        let mut session = Self::assemble(settings);
        session.set_state(ConnectionState::Connecting);
        info!(
            host = %settings.broker.host,
            port = settings.broker.port,
            network = %session.router.network_id(),
            "connecting to broker"
        );

        loop {
            match session.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => match ack.code {
                    ConnectReturnCode::Success => {
                        session.set_state(ConnectionState::Connected);
                        info!("broker accepted connection");
                        return Ok(session);
                    }
                    ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized => {
                        return Err(ConnectionError::AuthRejected);
                    }
                    code => {
                        return Err(ConnectionError::ProtocolError(format!(
                            "connection refused: {code:?}"
                        )));
                    }
                },
                Ok(_) => continue,
                Err(err) => return Err(ConnectionError::from_transport(err)),
            }
        }
    }

    /// Returns a cloneable handle for publishing downlink messages while the
    /// receive loop runs.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            client: self.client.clone(),
            router: self.router.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// The receive loop. Occupies the calling task until `cancel` fires or a
    /// non-retryable failure occurs.
    ///
    /// Every reconnect acknowledgement re-issues the uplink subscription, so
    /// a transport drop never leaves the session connected but deaf. Errors
    /// in per-message handling (topic parsing, the ingestion handler) are
    /// isolated to that message; only credential rejection terminates the
    /// loop with an error.
    pub async fn run<H>(
        mut self,
        mut handler: H,
        cancel: CancellationToken,
    ) -> Result<(), ConnectionError>
    where
        H: UplinkHandler,
    {
        let mut backoff = Backoff::default();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested, disconnecting from broker");
                    let _ = self.client.disconnect().await;
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
                polled = self.eventloop.poll() => match polled {
                    Ok(event) => {
                        backoff.reset();
                        match self.on_event(event, &mut handler) {
                            Action::Subscribe(filter) => {
                                if let Err(err) = self.client.subscribe(filter.clone(), QOS).await {
                                    warn!(error = %err, filter = %filter, "subscribe request failed");
                                }
                            }
                            Action::Fatal(err) => {
                                error!(error = %err, "non-retryable session failure");
                                self.set_state(ConnectionState::Failed);
                                return Err(err);
                            }
                            Action::Continue => {}
                        }
                    }
                    Err(err) if is_auth_rejection(&err) => {
                        error!("broker rejected credentials on reconnect");
                        self.set_state(ConnectionState::Failed);
                        return Err(ConnectionError::AuthRejected);
                    }
                    Err(err) => {
                        self.set_state(ConnectionState::Connecting);
                        let delay = backoff.next_delay();
                        warn!(
                            error = %err,
                            delay_ms = delay.as_millis() as u64,
                            "transport error, reconnecting"
                        );
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                self.set_state(ConnectionState::Disconnected);
                                return Ok(());
                            }
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }
    }

    /// Handles one event from the broker and decides what the loop does
    /// next. Pure with respect to the network, which keeps the dispatch
    /// logic testable without a broker.
    pub(crate) fn on_event(&self, event: Event, handler: &mut dyn UplinkHandler) -> Action {
        match event {
            Event::Incoming(Packet::ConnAck(ack)) => match ack.code {
                ConnectReturnCode::Success => {
                    self.set_state(ConnectionState::Connected);
                    info!(filter = %self.uplink_filter, "connected, subscribing to uplink filter");
                    Action::Subscribe(self.uplink_filter.clone())
                }
                ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized => {
                    Action::Fatal(ConnectionError::AuthRejected)
                }
                code => {
                    warn!(?code, "broker refused connection");
                    Action::Continue
                }
            },
            Event::Incoming(Packet::SubAck(_)) => {
                self.set_state(ConnectionState::Subscribed);
                info!("uplink subscription acknowledged");
                Action::Continue
            }
            Event::Incoming(Packet::Publish(publish)) => {
                self.on_publish(publish, handler);
                Action::Continue
            }
            Event::Incoming(Packet::Disconnect) => {
                self.set_state(ConnectionState::Connecting);
                warn!("broker closed the connection");
                Action::Continue
            }
            _ => Action::Continue,
        }
    }

    /// Routes one received frame to the ingestion handler. Failures are
    /// logged and the message dropped.
    fn on_publish(&self, publish: Publish, handler: &mut dyn UplinkHandler) {
        let topic = match self.router.parse(&publish.topic) {
            Ok(topic) => topic,
            Err(err) => {
                warn!(topic = %publish.topic, error = %err, "dropping message with unroutable topic");
                return;
            }
        };

        if topic.direction != Direction::Up {
            debug!(topic = %topic, "ignoring non-uplink message");
            return;
        }

        let message = self.router.to_inbound(topic, publish.payload.to_vec());
        if let Err(err) = handler.handle(message) {
            warn!(error = %err, "uplink handler failed, message dropped");
        }
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap() = state;
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap()
    }
}

/// Cloneable publish handle for downlink messages.
///
/// Valid to use concurrently with the running receive loop; the MQTT
/// client's request channel serializes writes onto the single transport
/// writer.
#[derive(Clone)]
pub struct SessionHandle {
    client: AsyncClient,
    router: TopicRouter,
    state: Arc<RwLock<ConnectionState>>,
}

impl SessionHandle {
    /// Publishes a downlink message to one device.
    ///
    /// Fails with [`PublishError::NotConnected`] before any I/O when the
    /// session is not connected; the caller decides whether to retry or
    /// drop.
    pub async fn publish(&self, message: OutboundMessage) -> Result<(), PublishError> {
        if !self.state().can_publish() {
            return Err(PublishError::NotConnected);
        }

        let topic = self.router.downlink_topic(&message.device_id)?;
        debug!(topic = %topic, bytes = message.payload.len(), "publishing downlink message");
        self.client
            .publish(topic.to_string(), QOS, false, message.payload)
            .await?;
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap()
    }
}
