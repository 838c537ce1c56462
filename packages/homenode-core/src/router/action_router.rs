//! Topic → callback bindings on top of a [`Transport`].
//!
//! Every binding is re-subscribed on every connect, whether or not the broker
//! kept the session. Inbound messages are matched by exact topic string and
//! fan out to all matching bindings in registration order.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::fragments::FragmentAssembler;
use super::transport::{publish_checked, InboundMessage, QosLevel, Transport, TransportResult};
use crate::error::{ErrorCode, NodeResult};

/// Callback invoked with the payload of a matching message.
pub type ActionCallback = Arc<dyn Fn(&str) -> NodeResult<()> + Send + Sync>;

/// Runs after every connect, once all bindings were resubscribed.
pub type ConnectHook = Arc<dyn Fn() + Send + Sync>;

/// One registered (topic, QoS, callback) triple.
#[derive(Clone)]
pub struct ActionBinding {
    pub topic: String,
    pub qos: QosLevel,
    callback: ActionCallback,
}

impl std::fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBinding")
            .field("topic", &self.topic)
            .field("qos", &self.qos)
            .finish_non_exhaustive()
    }
}

/// Collects bindings; the set is fixed once built.
pub struct ActionRouterBuilder {
    transport: Arc<dyn Transport>,
    bindings: Vec<ActionBinding>,
    connect_hooks: Vec<ConnectHook>,
}

impl ActionRouterBuilder {
    /// Binds `callback` to `topic` at QoS 0.
    pub fn bind<F>(self, topic: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str) -> NodeResult<()> + Send + Sync + 'static,
    {
        self.bind_with_qos(topic, QosLevel::AtMostOnce, callback)
    }

    pub fn bind_with_qos<F>(mut self, topic: impl Into<String>, qos: QosLevel, callback: F) -> Self
    where
        F: Fn(&str) -> NodeResult<()> + Send + Sync + 'static,
    {
        self.bindings.push(ActionBinding {
            topic: topic.into(),
            qos,
            callback: Arc::new(callback),
        });
        self
    }

    /// Adds a hook run after each (re)connect, after the subscriptions.
    pub fn after_connect<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.connect_hooks.push(Arc::new(hook));
        self
    }

    /// Builds the router and hooks it into the transport's callbacks.
    ///
    /// The transport only holds weak references, so dropping the router
    /// silences the callbacks.
    pub fn build(self) -> Arc<ActionRouter> {
        let router = Arc::new(ActionRouter {
            transport: self.transport,
            bindings: self.bindings,
            connect_hooks: self.connect_hooks,
            fragments: Mutex::new(FragmentAssembler::new()),
        });

        let weak: Weak<ActionRouter> = Arc::downgrade(&router);
        router.transport.on_connect(Arc::new(move |session_present| {
            if let Some(router) = weak.upgrade() {
                router.on_transport_connect(session_present);
            }
        }));

        let weak: Weak<ActionRouter> = Arc::downgrade(&router);
        router.transport.on_message(Arc::new(move |msg| {
            if let Some(router) = weak.upgrade() {
                router.on_transport_message(msg);
            }
        }));

        log::debug!("[Router] Built with {} binding(s)", router.bindings.len());
        router
    }
}

pub struct ActionRouter {
    transport: Arc<dyn Transport>,
    bindings: Vec<ActionBinding>,
    connect_hooks: Vec<ConnectHook>,
    fragments: Mutex<FragmentAssembler>,
}

impl ActionRouter {
    pub fn builder(transport: Arc<dyn Transport>) -> ActionRouterBuilder {
        ActionRouterBuilder {
            transport,
            bindings: Vec::new(),
            connect_hooks: Vec::new(),
        }
    }

    /// Subscribes every binding at its QoS, then runs the connect hooks.
    ///
    /// `session_present` is logged only; subscriptions are always renewed.
    /// Returns how many subscribe calls succeeded.
    pub fn on_transport_connect(&self, session_present: bool) -> usize {
        log::info!(
            "[Router] Transport connected (session_present={}), subscribing {} binding(s)",
            session_present,
            self.bindings.len()
        );

        let mut subscribed = 0;
        for binding in &self.bindings {
            match self.transport.subscribe(&binding.topic, binding.qos) {
                Ok(()) => subscribed += 1,
                Err(e) => log::warn!(
                    "[Router] Subscribe to {} failed [{}]: {}",
                    binding.topic,
                    e.code(),
                    e
                ),
            }
        }

        for hook in &self.connect_hooks {
            hook();
        }
        subscribed
    }

    /// Reassembles fragments and dispatches complete messages.
    ///
    /// Returns the number of callbacks invoked.
    pub fn on_transport_message(&self, msg: InboundMessage) -> usize {
        let topic = msg.topic.clone();
        let Some(payload) = self.fragments.lock().push(msg) else {
            return 0;
        };
        let payload = String::from_utf8_lossy(&payload);
        self.dispatch(&topic, &payload)
    }

    /// Invokes every binding whose topic equals `topic`, in registration
    /// order. Callback errors are logged and do not stop the fan-out.
    pub fn dispatch(&self, topic: &str, payload: &str) -> usize {
        let mut invoked = 0;
        for binding in self.bindings.iter().filter(|b| b.topic == topic) {
            invoked += 1;
            if let Err(e) = (binding.callback)(payload) {
                log::warn!(
                    "[Router] Action on {} failed [{}]: {}",
                    topic,
                    e.code(),
                    e
                );
            }
        }
        if invoked == 0 {
            log::debug!("[Router] No binding for {}", topic);
        }
        invoked
    }

    /// Publishes through the transport; a disconnected transport drops it.
    pub fn publish(&self, topic: &str, payload: &str, retain: bool) -> TransportResult<()> {
        publish_checked(self.transport.as_ref(), topic, payload, retain)
    }

    pub fn bindings(&self) -> &[ActionBinding] {
        &self.bindings
    }
}
