//! Outbound state snapshots.
//!
//! This module provides:
//! - [`StateSnapshot`], the JSON document published whenever the player state changes
//! - [`StateEmitter`] trait for the playback controller to hand snapshots off
//! - No-op and logging emitters for tests and headless runs
//!
//! The transport-backed emitter lives in [`crate::router::publisher`].

mod emitter;

pub use emitter::{LoggingStateEmitter, NoopStateEmitter, StateEmitter};

use serde::Serialize;

/// Category menu included in full snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioMenu {
    /// Currently selected category, empty when nothing is selected.
    pub selected_genre: String,
    /// All category names in catalog order.
    pub genres: Vec<String>,
}

/// Player state as published to the state topic.
///
/// Partial snapshots (after a title or volume change) leave `audio_menu` out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Whether the player is logically on.
    pub is_on: bool,
    /// Requested volume. Stays at the requested level while muted.
    pub volume: u8,
    /// Title of the current track, `null` until the engine reports one.
    pub title: Option<String>,
    /// Category menu, present in full snapshots only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_menu: Option<AudioMenu>,
}

impl StateSnapshot {
    /// Serializes the snapshot to its JSON payload.
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
