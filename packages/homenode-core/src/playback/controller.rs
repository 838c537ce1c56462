//! Playback controller: reconciles requested state with the decode engine.
//!
//! Requests arrive from the transport callback context, engine events from
//! the playback loop. Playback state, catalog selection and the RNG share one
//! lock so a category or volume change can never interleave with a
//! track-ended event starting a track from a stale category. Snapshots are
//! emitted after the lock is released.

use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::state::{parse_volume, PlaybackPhase, PlaybackState, StateCommand};
use crate::catalog::{random_index, Catalog};
use crate::config::Config;
use crate::decoder::DecodeEngine;
use crate::error::{NodeError, NodeResult};
use crate::events::{AudioMenu, StateEmitter, StateSnapshot};
use crate::protocol_constants::MAX_CATEGORY_NAME_BYTES;
use crate::source::{build_source, ContentSource, SourceKind};

/// Static playback settings taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub default_volume: u8,
    pub max_volume: u8,
    pub default_category: Option<String>,
}

impl From<&Config> for PlaybackSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_volume: config.default_volume,
            max_volume: config.max_volume,
            default_category: config.default_category.clone(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

struct Inner {
    state: PlaybackState,
    catalog: Catalog,
    rng: SmallRng,
}

/// Which parts of the state a snapshot carries.
#[derive(Clone, Copy)]
enum SnapshotKind {
    Full,
    Partial,
}

pub struct PlaybackController {
    source: Arc<dyn ContentSource>,
    engine: Arc<dyn DecodeEngine>,
    emitter: Arc<dyn StateEmitter>,
    settings: PlaybackSettings,
    inner: Mutex<Inner>,
}

impl PlaybackController {
    /// Builds the content source for `kind` and sets the default volume.
    ///
    /// Does not start playback.
    pub fn initialize(
        kind: &SourceKind,
        config: &Config,
        engine: Arc<dyn DecodeEngine>,
        emitter: Arc<dyn StateEmitter>,
        http: reqwest::Client,
    ) -> Self {
        let source = build_source(kind, &config.discovery, http);
        log::info!("[Playback] Using {} content source", source.name());
        Self::with_source(source, engine, emitter, PlaybackSettings::from(config))
    }

    /// Creates a controller around an already constructed source.
    pub fn with_source(
        source: Arc<dyn ContentSource>,
        engine: Arc<dyn DecodeEngine>,
        emitter: Arc<dyn StateEmitter>,
        settings: PlaybackSettings,
    ) -> Self {
        engine.set_volume(settings.default_volume);
        let inner = Inner {
            state: PlaybackState::new(settings.default_volume),
            catalog: Catalog::new(),
            rng: SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            source,
            engine,
            emitter,
            settings,
            inner: Mutex::new(inner),
        }
    }

    /// Replaces the RNG with a seeded one for reproducible track selection.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        self.inner.lock().rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Enumerates the source, selects the default category and starts a
    /// random track. Publishes a full snapshot.
    pub async fn start(&self) {
        let mut catalog = self.source.enumerate().await;
        catalog.apply_default_selection(self.settings.default_category.as_deref());

        let snapshot = {
            let mut inner = self.inner.lock();
            inner.catalog = catalog;
            inner.state.requested_on = true;
            log::info!(
                "[Playback] Starting with category {:?} ({} tracks in catalog)",
                inner.catalog.selected().unwrap_or_default(),
                inner.catalog.total_tracks()
            );
            self.start_random_track(&mut inner);
            Self::build_snapshot(&inner, SnapshotKind::Full)
        };
        self.emitter.emit_state(&snapshot);
    }

    /// Applies a volume payload. The level is forwarded to the engine even
    /// while muted, so it takes effect on the next `on`.
    ///
    /// # Errors
    /// [`NodeError::InvalidArgument`] for non-numeric or out-of-range payloads.
    pub fn request_volume(&self, payload: &str) -> NodeResult<u8> {
        let volume = parse_volume(payload, self.settings.max_volume)?;

        let snapshot = {
            let mut inner = self.inner.lock();
            inner.state.volume = volume;
            self.engine.set_volume(volume);
            Self::build_snapshot(&inner, SnapshotKind::Partial)
        };
        log::debug!("[Playback] Volume set to {}", volume);
        self.emitter.emit_state(&snapshot);
        Ok(volume)
    }

    /// Applies an `on` / `off` payload.
    ///
    /// # Errors
    /// [`NodeError::UnrecognizedCommand`] for any other payload.
    pub fn request_state_change(&self, payload: &str) -> NodeResult<()> {
        match payload.parse::<StateCommand>()? {
            StateCommand::On => self.turn_on(),
            StateCommand::Off => self.turn_off(),
        }
        Ok(())
    }

    /// Mutes the engine and pauses the source.
    ///
    /// The engine is not stopped; buffered audio may keep coming for a while.
    pub fn turn_off(&self) {
        let snapshot = {
            let mut inner = self.inner.lock();
            if !inner.state.requested_on {
                log::debug!("[Playback] Already off");
                return;
            }
            inner.state.requested_on = false;
            self.engine.set_volume(0);
            self.source.pause();
            if inner.state.phase == PlaybackPhase::Playing {
                inner.state.phase = PlaybackPhase::Paused;
            }
            Self::build_snapshot(&inner, SnapshotKind::Partial)
        };
        log::info!("[Playback] Off");
        self.emitter.emit_state(&snapshot);
    }

    /// Restores the requested volume and resumes the source. Starts a new
    /// random track if the engine has gone idle in the meantime.
    pub fn turn_on(&self) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.state.requested_on = true;

            if !self.source.is_running() {
                self.engine.set_volume(inner.state.volume);
                self.source.resume();
                if self.engine.is_busy() {
                    inner.state.phase = PlaybackPhase::Playing;
                } else {
                    self.start_random_track(&mut inner);
                }
            }
            Self::build_snapshot(&inner, SnapshotKind::Partial)
        };
        log::info!("[Playback] On");
        self.emitter.emit_state(&snapshot);
    }

    /// Hard-stops the current track and switches category.
    ///
    /// When logically on a random track from the new category starts. When
    /// off only the selection changes: the engine is muted and the source
    /// paused, so a track started now would play silently with nothing left
    /// to unmute it on `on` (the source would already report running). The
    /// next `on` finds the engine idle and starts from the new category.
    ///
    /// # Errors
    /// [`NodeError::InvalidArgument`] for names with control characters or
    /// longer than [`MAX_CATEGORY_NAME_BYTES`].
    pub fn request_category_change(&self, name: &str) -> NodeResult<()> {
        if name.len() > MAX_CATEGORY_NAME_BYTES {
            return Err(NodeError::InvalidArgument(format!(
                "category name is {} bytes, limit is {}",
                name.len(),
                MAX_CATEGORY_NAME_BYTES
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(NodeError::InvalidArgument(format!(
                "category name {:?} contains control characters",
                name
            )));
        }

        let snapshot = {
            let mut inner = self.inner.lock();
            self.engine.stop();
            inner.state.current_title = None;
            inner.catalog.select(name);
            if !inner.catalog.contains(name) {
                log::warn!("[Playback] Unknown category {:?}", name);
            }

            if inner.state.requested_on {
                self.start_random_track(&mut inner);
            } else {
                inner.state.phase = PlaybackPhase::Stopped;
            }
            Self::build_snapshot(&inner, SnapshotKind::Full)
        };
        log::info!("[Playback] Category changed to {:?}", name);
        self.emitter.emit_state(&snapshot);
        Ok(())
    }

    /// Engine reported the end of the current track.
    pub fn on_track_ended(&self) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.state.current_title = None;
            if !inner.state.requested_on {
                inner.state.phase = PlaybackPhase::Stopped;
                return;
            }
            self.start_random_track(&mut inner);
            Self::build_snapshot(&inner, SnapshotKind::Partial)
        };
        self.emitter.emit_state(&snapshot);
    }

    /// Engine reported a title for the current track.
    pub fn on_track_metadata(&self, title: &str) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.state.current_title = Some(title.to_string());
            Self::build_snapshot(&inner, SnapshotKind::Partial)
        };
        log::debug!("[Playback] Now playing {:?}", title);
        self.emitter.emit_state(&snapshot);
    }

    /// Full snapshot of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        Self::build_snapshot(&self.inner.lock(), SnapshotKind::Full)
    }

    /// Emits a full snapshot without changing any state.
    ///
    /// Used after a transport (re)connect, when earlier snapshots may have
    /// been dropped.
    pub fn publish_snapshot(&self) {
        let snapshot = self.snapshot();
        self.emitter.emit_state(&snapshot);
    }

    /// Copy of the playback state.
    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state.clone()
    }

    /// Category names in catalog order.
    pub fn category_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .catalog
            .category_names()
            .map(str::to_string)
            .collect()
    }

    /// Currently selected category.
    pub fn selected_category(&self) -> Option<String> {
        self.inner.lock().catalog.selected().map(str::to_string)
    }

    pub fn engine(&self) -> &Arc<dyn DecodeEngine> {
        &self.engine
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    /// Picks a random track from the active category and hands it to the
    /// source. An empty category leaves playback stopped.
    fn start_random_track(&self, inner: &mut Inner) -> bool {
        inner.state.current_title = None;

        let Inner {
            state,
            catalog,
            rng,
        } = inner;
        let tracks = catalog.active_tracks();

        let Some(len) = NonZeroUsize::new(tracks.len()) else {
            log::info!(
                "[Playback] Category {:?} has no tracks, staying stopped",
                catalog.selected().unwrap_or_default()
            );
            state.phase = PlaybackPhase::Stopped;
            return false;
        };

        let track = &tracks[random_index(len, rng)];
        if self.source.play(track, self.engine.as_ref()) {
            log::info!("[Playback] Playing {}", track);
            state.phase = PlaybackPhase::Playing;
            true
        } else {
            state.phase = PlaybackPhase::Stopped;
            false
        }
    }

    fn build_snapshot(inner: &Inner, kind: SnapshotKind) -> StateSnapshot {
        let audio_menu = match kind {
            SnapshotKind::Full => Some(AudioMenu {
                selected_genre: inner.catalog.selected().unwrap_or_default().to_string(),
                genres: inner.catalog.category_names().map(str::to_string).collect(),
            }),
            SnapshotKind::Partial => None,
        };
        StateSnapshot {
            is_on: inner.state.requested_on,
            volume: inner.state.volume,
            title: inner.state.current_title.clone(),
            audio_menu,
        }
    }
}
