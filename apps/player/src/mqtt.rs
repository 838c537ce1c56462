//! MQTT implementation of the core [`Transport`].
//!
//! The rumqttc event loop runs on its own task once `connect` is called. It
//! reconnects on its own after errors; every ConnAck is forwarded to the
//! connect callback so the router can resubscribe (sessions are clean).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use homenode_core::router::{ConnectCallback, MessageCallback, TransportResult};
use homenode_core::{InboundMessage, QosLevel, Transport, TransportError};
use parking_lot::{Mutex, RwLock};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::MqttConfig;

/// Requests the client may queue before `try_*` calls start failing.
const REQUEST_CAPACITY: usize = 32;

fn to_mqtt_qos(qos: QosLevel) -> QoS {
    match qos {
        QosLevel::AtMostOnce => QoS::AtMostOnce,
        QosLevel::AtLeastOnce => QoS::AtLeastOnce,
    }
}

/// State shared between the transport handle and the event loop task.
#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    on_connect: RwLock<Option<ConnectCallback>>,
    on_message: RwLock<Option<MessageCallback>>,
}

impl Shared {
    /// Applies one event loop notification.
    fn handle_event(&self, event: Event) {
        match event {
            Event::Incoming(Packet::ConnAck(ack)) => {
                self.connected.store(true, Ordering::SeqCst);
                log::info!(
                    "[MQTT] Connected (session_present={})",
                    ack.session_present
                );
                // Clone out of the lock: the callback subscribes through us
                let callback = self.on_connect.read().clone();
                if let Some(callback) = callback {
                    callback(ack.session_present);
                }
            }
            Event::Incoming(Packet::Publish(publish)) => {
                let callback = self.on_message.read().clone();
                if let Some(callback) = callback {
                    callback(InboundMessage::complete(publish.topic, publish.payload));
                }
            }
            Event::Incoming(Packet::Disconnect) => {
                log::warn!("[MQTT] Broker closed the session");
                self.connected.store(false, Ordering::SeqCst);
            }
            _ => {}
        }
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Transport over an MQTT broker connection.
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: Mutex<Option<EventLoop>>,
    task: Mutex<Option<JoinHandle<()>>>,
    shared: Arc<Shared>,
    publish_qos: QoS,
    reconnect_delay: Duration,
}

impl MqttTransport {
    /// Creates the client. Nothing touches the network until [`Transport::connect`].
    pub fn new(config: &MqttConfig, publish_qos: QosLevel) -> Self {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
        options.set_clean_session(true);
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.clone().unwrap_or_default());
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        Self {
            client,
            event_loop: Mutex::new(Some(event_loop)),
            task: Mutex::new(None),
            shared: Arc::new(Shared::default()),
            publish_qos: to_mqtt_qos(publish_qos),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
        }
    }

    /// Disconnects from the broker and stops the event loop task.
    pub fn shutdown(&self) {
        if let Err(e) = self.client.try_disconnect() {
            log::debug!("[MQTT] Disconnect request failed: {}", e);
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.shared.mark_disconnected();
    }
}

async fn run_event_loop(mut event_loop: EventLoop, shared: Arc<Shared>, reconnect_delay: Duration) {
    loop {
        match event_loop.poll().await {
            Ok(event) => shared.handle_event(event),
            Err(e) => {
                if shared.connected.swap(false, Ordering::SeqCst) {
                    log::warn!("[MQTT] Connection lost: {}", e);
                } else {
                    log::debug!("[MQTT] Connect attempt failed: {}", e);
                }
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

impl Transport for MqttTransport {
    fn connect(&self) -> TransportResult<()> {
        let handle = Handle::try_current()
            .map_err(|e| TransportError::Rejected(format!("no tokio runtime: {}", e)))?;

        let Some(event_loop) = self.event_loop.lock().take() else {
            log::debug!("[MQTT] Event loop already running");
            return Ok(());
        };

        let task = handle.spawn(run_event_loop(
            event_loop,
            Arc::clone(&self.shared),
            self.reconnect_delay,
        ));
        *self.task.lock() = Some(task);

        log::info!("[MQTT] Connecting...");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self, topic: &str, qos: QosLevel) -> TransportResult<()> {
        self.client
            .try_subscribe(topic, to_mqtt_qos(qos))
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    fn publish(&self, topic: &str, payload: &str, retain: bool) -> TransportResult<()> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        self.client
            .try_publish(topic, self.publish_qos, retain, payload.as_bytes().to_vec())
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    fn on_connect(&self, callback: ConnectCallback) {
        *self.shared.on_connect.write() = Some(callback);
    }

    fn on_message(&self, callback: MessageCallback) {
        *self.shared.on_message.write() = Some(callback);
    }
}
