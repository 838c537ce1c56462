//! Homenode Core - playback control core for Homenode audio nodes.
//!
//! This crate turns control messages arriving over a messaging transport into
//! playback on an audio decoding engine, and publishes the resulting player
//! state back out. It is used by the standalone player app and shares its
//! wiring with the device firmware builds.
//!
//! # Architecture
//!
//! - [`catalog`]: Category → track mapping and random selection
//! - [`source`]: Content sources (local storage walk, remote UPnP media server)
//! - [`upnp`]: SSDP discovery and ContentDirectory browsing for remote sources
//! - [`playback`]: The playback state machine and the loop stepping the engine
//! - [`router`]: Topic → action bindings over the transport
//! - [`events`]: Outbound state snapshots
//! - [`config`]: Node configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! Device specifics stay behind narrow traits:
//!
//! - [`Transport`](router::Transport): connect, subscribe, publish, callbacks
//! - [`DecodeEngine`](decoder::DecodeEngine): the opaque audio decoder
//! - [`ContentSource`](source::ContentSource): catalog and playback primitives
//! - [`StateEmitter`](events::StateEmitter): where snapshots go

#![warn(clippy::all)]

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod decoder;
pub mod error;
pub mod events;
pub mod playback;
pub mod protocol_constants;
pub mod router;
pub mod source;
pub mod upnp;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use catalog::{Catalog, Track, UNCATEGORIZED};
pub use config::{Config, DiscoveryConfig, TopicConfig};
pub use decoder::{DecodeEngine, DecodeEvent, TrackLocation};
pub use error::{ErrorCode, NodeError, NodeResult};
pub use events::{AudioMenu, LoggingStateEmitter, NoopStateEmitter, StateEmitter, StateSnapshot};

// Re-export playback types
pub use playback::{
    PlaybackController, PlaybackLoop, PlaybackPhase, PlaybackSettings, PlaybackState,
};

// Re-export router types
pub use router::{
    ActionRouter, InboundMessage, QosLevel, TopicStateEmitter, Transport, TransportError,
};

// Re-export source types
pub use source::{ContentSource, RetryPolicy, SourceKind};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_player, PlayerServices};
