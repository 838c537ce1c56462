//! Playback state and control payload parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::{NodeError, NodeResult};

/// What the decode engine is actually doing, as far as the controller knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Stopped,
    Playing,
    /// Logically off with the engine possibly still draining buffered audio.
    Paused,
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Requested and actual player state.
///
/// `requested_on` is what the user asked for; `phase` is what the engine is
/// doing. The two converge eventually because the engine cannot be halted
/// synchronously. `volume` is the requested level and survives a mute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub requested_on: bool,
    pub volume: u8,
    pub current_title: Option<String>,
}

impl PlaybackState {
    pub fn new(volume: u8) -> Self {
        Self {
            phase: PlaybackPhase::Stopped,
            requested_on: false,
            volume,
            current_title: None,
        }
    }
}

/// Payload of a state-change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCommand {
    On,
    Off,
}

impl FromStr for StateCommand {
    type Err = NodeError;

    /// Accepts exactly `on` and `off`.
    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        match payload {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(NodeError::UnrecognizedCommand(other.to_string())),
        }
    }
}

/// Parses a decimal volume payload and checks it against `max`.
///
/// Surrounding ASCII whitespace is ignored. Anything else that is not a
/// number in `0..=max` is rejected rather than clamped.
pub fn parse_volume(payload: &str, max: u8) -> NodeResult<u8> {
    let trimmed = payload.trim_matches(|c: char| c.is_ascii_whitespace());
    let value: u32 = trimmed
        .parse()
        .map_err(|_| NodeError::InvalidArgument(format!("volume {:?} is not a number", payload)))?;

    if value > u32::from(max) {
        return Err(NodeError::InvalidArgument(format!(
            "volume {} outside 0..={}",
            value, max
        )));
    }
    // Bounded by `max` above
    Ok(value as u8)
}
