//! State emitter that publishes snapshots to a topic.

use std::sync::Arc;

use super::transport::{publish_checked, Transport};
use crate::events::{StateEmitter, StateSnapshot};

/// Publishes every snapshot as JSON on a fixed topic.
///
/// Goes straight to the transport so the controller can be built before the
/// router that will call into it.
pub struct TopicStateEmitter {
    transport: Arc<dyn Transport>,
    topic: String,
    retain: bool,
}

impl TopicStateEmitter {
    pub fn new(transport: Arc<dyn Transport>, topic: impl Into<String>, retain: bool) -> Self {
        Self {
            transport,
            topic: topic.into(),
            retain,
        }
    }
}

impl StateEmitter for TopicStateEmitter {
    fn emit_state(&self, snapshot: &StateSnapshot) {
        let payload = match snapshot.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("[Router] Failed to serialize state snapshot: {}", e);
                return;
            }
        };
        // Failures are logged by publish_checked and never retried
        let _ = publish_checked(self.transport.as_ref(), &self.topic, &payload, self.retain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTransport;

    fn snapshot() -> StateSnapshot {
        StateSnapshot {
            is_on: true,
            volume: 4,
            title: None,
            audio_menu: None,
        }
    }

    #[test]
    fn publishes_json_on_state_topic() {
        let transport = Arc::new(FakeTransport::new());
        transport.set_connected(true);
        let emitter = TopicStateEmitter::new(transport.clone(), "home/audio_player/state", true);

        emitter.emit_state(&snapshot());

        let published = transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "home/audio_player/state");
        assert_eq!(published[0].1, r#"{"is_on":true,"volume":4,"title":null}"#);
        assert!(published[0].2);
    }

    #[test]
    fn disconnected_transport_drops_snapshot() {
        let transport = Arc::new(FakeTransport::new());
        let emitter = TopicStateEmitter::new(transport.clone(), "s", false);
        emitter.emit_state(&snapshot());
        assert!(transport.published().is_empty());
    }
}
