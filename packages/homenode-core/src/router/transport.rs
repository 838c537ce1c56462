//! Messaging transport capability.
//!
//! The router only needs connect, subscribe, publish and two callback hooks.
//! Connection management, TLS and reconnect policy belong to the
//! implementation (see the MQTT transport in the player app).

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery guarantee requested for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QosLevel {
    AtMostOnce,
    AtLeastOnce,
}

impl From<QosLevel> for u8 {
    fn from(qos: QosLevel) -> Self {
        match qos {
            QosLevel::AtMostOnce => 0,
            QosLevel::AtLeastOnce => 1,
        }
    }
}

impl TryFrom<u8> for QosLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            other => Err(format!("unsupported QoS level {}", other)),
        }
    }
}

/// One inbound message or message fragment as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Bytes,
    /// Valid bytes of `payload` in this fragment.
    pub fragment_length: usize,
    /// Byte offset of this fragment within the whole message.
    pub fragment_index: usize,
    /// Length of the whole message.
    pub fragment_total: usize,
}

impl InboundMessage {
    /// A message delivered in one piece.
    pub fn complete(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let len = payload.len();
        Self {
            topic: topic.into(),
            payload,
            fragment_length: len,
            fragment_index: 0,
            fragment_total: len,
        }
    }
}

/// Called with `session_present` after every (re)connect.
pub type ConnectCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Called for every inbound message or fragment.
pub type MessageCallback = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Errors reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport is not connected to its broker.
    #[error("transport is disconnected")]
    Disconnected,

    /// The transport refused the request (queue full, bad topic, ...).
    #[error("transport rejected request: {0}")]
    Rejected(String),
}

/// Convenient Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// The narrow transport surface the router consumes.
///
/// Callbacks may be invoked from any thread, including from inside
/// `connect`.
pub trait Transport: Send + Sync {
    /// Starts connecting. Completion is reported through the connect callback.
    fn connect(&self) -> TransportResult<()>;

    fn is_connected(&self) -> bool;

    fn subscribe(&self, topic: &str, qos: QosLevel) -> TransportResult<()>;

    fn publish(&self, topic: &str, payload: &str, retain: bool) -> TransportResult<()>;

    /// Registers the connect callback, replacing any previous one.
    fn on_connect(&self, callback: ConnectCallback);

    /// Registers the message callback, replacing any previous one.
    fn on_message(&self, callback: MessageCallback);
}

/// Publishes if the transport is connected.
///
/// A disconnected transport is a logged no-op: the message is dropped and
/// never retried.
pub fn publish_checked(
    transport: &dyn Transport,
    topic: &str,
    payload: &str,
    retain: bool,
) -> TransportResult<()> {
    if !transport.is_connected() {
        log::warn!("[Router] Dropping publish to {}: transport disconnected", topic);
        return Err(TransportError::Disconnected);
    }
    transport.publish(topic, payload, retain).inspect_err(|e| {
        log::warn!("[Router] Publish to {} failed: {}", topic, e);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTransport;

    #[test]
    fn qos_round_trips_through_u8() {
        assert_eq!(QosLevel::try_from(1), Ok(QosLevel::AtLeastOnce));
        assert_eq!(u8::from(QosLevel::AtMostOnce), 0);
        assert!(QosLevel::try_from(2).is_err());
        let parsed: QosLevel = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, QosLevel::AtMostOnce);
    }

    #[test]
    fn complete_message_covers_whole_payload() {
        let msg = InboundMessage::complete("t", "hello");
        assert_eq!(msg.fragment_length, 5);
        assert_eq!(msg.fragment_index, 0);
        assert_eq!(msg.fragment_total, 5);
    }

    #[test]
    fn publish_while_disconnected_is_dropped() {
        let transport = FakeTransport::new();
        assert_eq!(
            publish_checked(&transport, "t", "x", false),
            Err(TransportError::Disconnected)
        );
        assert!(transport.published().is_empty());

        transport.set_connected(true);
        publish_checked(&transport, "t", "x", true).unwrap();
        assert_eq!(
            transport.published(),
            vec![("t".to_string(), "x".to_string(), true)]
        );
    }
}
