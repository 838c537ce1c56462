//! Decoding engine capability.
//!
//! The audio decoder itself (bitstream parsing, DAC timing) lives outside this
//! crate. The playback core only needs the narrow set of operations below.
//! The engine cannot be interrupted synchronously: muting and stopping are
//! requests, and buffered audio may keep coming for a short while.

use std::path::PathBuf;

/// Where the engine should read a track from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackLocation {
    /// A file on locally mounted storage.
    File(PathBuf),
    /// A network resource fetched over HTTP.
    Url(String),
}

/// Events reported by the engine while it advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// The current track (or stream) reached its end.
    TrackEnded,
    /// The engine found a title for the current track.
    Metadata {
        /// Track title as reported by the stream tags.
        title: String,
    },
    /// Informational message from the engine (bitrate, station, ...).
    Info(String),
}

/// Operations the playback core needs from an audio decoding engine.
///
/// Implementations must be callable from both the playback loop and the
/// transport callback context.
pub trait DecodeEngine: Send + Sync {
    /// Sets the output volume. `0` mutes without stopping decoding.
    fn set_volume(&self, volume: u8);

    /// Starts decoding the given location, replacing whatever was playing.
    ///
    /// Returns `false` if the engine could not open the location.
    fn connect_to_source(&self, location: &TrackLocation) -> bool;

    /// Returns true while the engine is producing audio.
    fn is_busy(&self) -> bool;

    /// Advances decoding and returns the events produced by this step.
    fn step_decode(&self) -> Vec<DecodeEvent>;

    /// Hard-stops the current track. Does not report [`DecodeEvent::TrackEnded`].
    fn stop(&self);
}
