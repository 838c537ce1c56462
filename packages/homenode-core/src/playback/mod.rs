//! Media playback control.
//!
//! - `state` - Playback phase, requested state and payload parsing
//! - `controller` - [`PlaybackController`], the state machine
//! - `driver` - [`PlaybackLoop`], which steps the decode engine

pub mod controller;
pub mod driver;
pub mod state;

pub use controller::{PlaybackController, PlaybackSettings};
pub use driver::PlaybackLoop;
pub use state::{parse_volume, PlaybackPhase, PlaybackState, StateCommand};
