//! Message-triggered action routing.
//!
//! - `transport` - The transport capability the router consumes
//! - `fragments` - Reassembly of fragmented inbound messages
//! - `action_router` - Topic bindings, resubscription and dispatch
//! - `actions` - Callback combinators for common payload shapes
//! - `publisher` - Snapshot emitter publishing through the transport

pub mod action_router;
pub mod actions;
pub mod fragments;
pub mod publisher;
pub mod transport;

pub use action_router::{
    ActionBinding, ActionCallback, ActionRouter, ActionRouterBuilder, ConnectHook,
};
pub use actions::on_off_action;
pub use publisher::TopicStateEmitter;
pub use transport::{
    publish_checked, ConnectCallback, InboundMessage, MessageCallback, QosLevel, Transport,
    TransportError, TransportResult,
};
