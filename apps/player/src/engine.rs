//! Decode engine backed by an external player process.
//!
//! Each track runs one child process built from the configured command
//! template. Track end is detected by polling the child. The player cannot
//! change volume at runtime, so a volume change restarts the current track at
//! the new level from the position reached so far. Volume `0` is such a
//! restart too: the track keeps running silently and still reports its end.

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use homenode_core::{DecodeEngine, DecodeEvent, TrackLocation};
use parking_lot::Mutex;

use crate::config::EngineConfig;

const URI_PLACEHOLDER: &str = "{uri}";
const VOLUME_PLACEHOLDER: &str = "{volume}";
const POSITION_PLACEHOLDER: &str = "{position}";

/// The process playing the current track.
struct Playing {
    child: Child,
    uri: String,
    /// Track position the child was started at.
    offset: Duration,
    started: Instant,
}

impl Playing {
    fn position(&self) -> Duration {
        self.offset + self.started.elapsed()
    }
}

#[derive(Default)]
struct EngineState {
    playing: Option<Playing>,
    volume: u8,
    /// Title to report on the next step, taken from the location.
    pending_title: Option<String>,
    /// A restart failed; the track is over from the controller's view.
    pending_end: bool,
}

/// Runs tracks through an external command such as `ffplay`.
pub struct ProcessDecodeEngine {
    command: Vec<String>,
    max_volume: u8,
    poll_interval: Duration,
    state: Mutex<EngineState>,
}

impl ProcessDecodeEngine {
    pub fn new(config: &EngineConfig, max_volume: u8) -> Self {
        Self {
            command: config.command.clone(),
            max_volume: max_volume.max(1),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Volume on the player's 0-100 scale.
    fn scaled_volume(&self, volume: u8) -> u32 {
        u32::from(volume.min(self.max_volume)) * 100 / u32::from(self.max_volume)
    }

    /// Expands the command template for one track.
    fn build_args(&self, uri: &str, volume: u8, position: Duration) -> Vec<String> {
        let scaled = self.scaled_volume(volume).to_string();
        let position = format!("{:.3}", position.as_secs_f64());
        self.command
            .iter()
            .map(|arg| {
                arg.replace(URI_PLACEHOLDER, uri)
                    .replace(VOLUME_PLACEHOLDER, &scaled)
                    .replace(POSITION_PLACEHOLDER, &position)
            })
            .collect()
    }

    fn spawn(&self, uri: &str, volume: u8, position: Duration) -> io::Result<Playing> {
        let args = self.build_args(uri, volume, position);
        let Some((program, rest)) = args.split_first() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "player command is empty",
            ));
        };

        let child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Playing {
            child,
            uri: uri.to_string(),
            offset: position,
            started: Instant::now(),
        })
    }
}

fn location_uri(location: &TrackLocation) -> String {
    match location {
        TrackLocation::File(path) => path.to_string_lossy().into_owned(),
        TrackLocation::Url(url) => url.clone(),
    }
}

/// Best-effort title: file stem, or the last path segment of a URL.
fn title_for(location: &TrackLocation) -> Option<String> {
    match location {
        TrackLocation::File(path) => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        TrackLocation::Url(url) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            let segment = path.rsplit('/').next().filter(|s| !s.is_empty())?;
            Path::new(segment)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        }
    }
}

fn kill_child(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("[Engine] Kill failed (already exited?): {}", e);
    }
    if let Err(e) = child.wait() {
        log::warn!("[Engine] Failed to reap player process: {}", e);
    }
}

impl DecodeEngine for ProcessDecodeEngine {
    fn set_volume(&self, volume: u8) {
        let mut state = self.state.lock();
        if state.volume == volume {
            return;
        }
        state.volume = volume;

        let Some(mut current) = state.playing.take() else {
            return;
        };
        let position = current.position();
        kill_child(&mut current.child);

        match self.spawn(&current.uri, volume, position) {
            Ok(playing) => {
                log::debug!(
                    "[Engine] Volume {} applied at {:.1}s",
                    volume,
                    position.as_secs_f64()
                );
                state.playing = Some(playing);
            }
            Err(e) => {
                log::warn!("[Engine] Failed to restart {} at new volume: {}", current.uri, e);
                state.pending_end = true;
            }
        }
    }

    fn connect_to_source(&self, location: &TrackLocation) -> bool {
        let mut state = self.state.lock();
        if let Some(mut previous) = state.playing.take() {
            kill_child(&mut previous.child);
        }
        state.pending_end = false;

        let uri = location_uri(location);
        match self.spawn(&uri, state.volume, Duration::ZERO) {
            Ok(playing) => {
                log::info!("[Engine] Playing {}", uri);
                state.playing = Some(playing);
                state.pending_title = title_for(location);
                true
            }
            Err(e) => {
                log::warn!("[Engine] Failed to start player for {}: {}", uri, e);
                false
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.state.lock().playing.is_some()
    }

    fn step_decode(&self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock();
            if let Some(title) = state.pending_title.take() {
                events.push(DecodeEvent::Metadata { title });
            }
            if std::mem::take(&mut state.pending_end) {
                events.push(DecodeEvent::TrackEnded);
                return events;
            }

            let Some(playing) = state.playing.as_mut() else {
                return events;
            };
            match playing.child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        events.push(DecodeEvent::Info(format!("player exited with {}", status)));
                    }
                    state.playing = None;
                    events.push(DecodeEvent::TrackEnded);
                    return events;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("[Engine] Lost track of player process: {}", e);
                    state.playing = None;
                    events.push(DecodeEvent::TrackEnded);
                    return events;
                }
            }
        }

        // Still playing: let the process work instead of spinning on try_wait
        std::thread::sleep(self.poll_interval);
        events
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.pending_title = None;
        state.pending_end = false;
        if let Some(mut playing) = state.playing.take() {
            kill_child(&mut playing.child);
        }
    }
}

impl Drop for ProcessDecodeEngine {
    fn drop(&mut self) {
        if let Some(mut playing) = self.state.get_mut().playing.take() {
            kill_child(&mut playing.child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn engine_with(command: &[&str]) -> ProcessDecodeEngine {
        let config = EngineConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            poll_interval_ms: 1,
        };
        ProcessDecodeEngine::new(&config, 21)
    }

    #[test]
    fn template_substitutes_uri_volume_and_position() {
        let engine = ProcessDecodeEngine::new(&EngineConfig::default(), 21);
        let args = engine.build_args("/media/rock/a.mp3", 21, Duration::ZERO);
        assert_eq!(args[0], "ffplay");
        assert!(args.contains(&"100".to_string()));
        assert!(args.contains(&"0.000".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/media/rock/a.mp3"));

        let args = engine.build_args("x", 7, Duration::from_millis(12_345));
        assert!(args.contains(&"33".to_string()));
        assert!(args.contains(&"12.345".to_string()));
    }

    #[test]
    fn titles_come_from_the_location() {
        assert_eq!(
            title_for(&TrackLocation::File(PathBuf::from("/sd/rock/Song One.mp3"))).as_deref(),
            Some("Song One")
        );
        assert_eq!(
            title_for(&TrackLocation::Url("http://nas:8200/MediaItems/22.flac?x=1".into()))
                .as_deref(),
            Some("22")
        );
        assert_eq!(title_for(&TrackLocation::Url("http://nas/".into())), None);
    }

    #[test]
    fn empty_command_refuses_tracks() {
        let engine = engine_with(&[]);
        assert!(!engine.connect_to_source(&TrackLocation::Url("http://x/a.mp3".into())));
        assert!(!engine.is_busy());
    }

    #[test]
    fn missing_program_refuses_tracks() {
        let engine = engine_with(&["/nonexistent/homenode-player-test", "{uri}"]);
        assert!(!engine.connect_to_source(&TrackLocation::File("a.mp3".into())));
    }

    #[test]
    fn volume_without_track_is_only_stored() {
        let engine = engine_with(&["/nonexistent/homenode-player-test"]);
        engine.set_volume(0);
        engine.set_volume(12);
        assert!(!engine.is_busy());
        assert!(engine.step_decode().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn finished_process_reports_track_end() {
        let engine = engine_with(&["true", "{uri}"]);
        engine.set_volume(10);
        assert!(engine.connect_to_source(&TrackLocation::File("/sd/jazz/take5.mp3".into())));

        let mut events = Vec::new();
        for _ in 0..1000 {
            events.extend(engine.step_decode());
            if events.contains(&DecodeEvent::TrackEnded) {
                break;
            }
        }
        assert_eq!(
            events.first(),
            Some(&DecodeEvent::Metadata {
                title: "take5".into()
            })
        );
        assert!(events.contains(&DecodeEvent::TrackEnded));
        assert!(!engine.is_busy());
    }

    #[cfg(unix)]
    #[test]
    fn mute_keeps_the_track_running() {
        let engine = engine_with(&["sleep", "30"]);
        engine.set_volume(10);
        assert!(engine.connect_to_source(&TrackLocation::File("a.mp3".into())));

        engine.set_volume(0);
        assert!(engine.is_busy());
        assert!(!engine.step_decode().contains(&DecodeEvent::TrackEnded));

        engine.set_volume(12);
        assert!(engine.is_busy());

        engine.stop();
        assert!(!engine.is_busy());
        assert!(engine.step_decode().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn restarted_track_still_reports_its_end() {
        let engine = engine_with(&["sleep", "0.2"]);
        engine.set_volume(10);
        assert!(engine.connect_to_source(&TrackLocation::File("a.mp3".into())));
        engine.set_volume(0);

        let ended = (0..5000).any(|_| engine.step_decode().contains(&DecodeEvent::TrackEnded));
        assert!(ended);
        assert!(!engine.is_busy());
    }

    mod with_controller {
        use super::*;
        use homenode_core::source::LocalSource;
        use homenode_core::{
            NoopStateEmitter, PlaybackController, PlaybackLoop, PlaybackPhase, PlaybackSettings,
        };
        use std::sync::Arc;

        fn library() -> tempfile::TempDir {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir_all(dir.path().join("rock")).unwrap();
            std::fs::write(dir.path().join("rock/a.mp3"), b"ID3").unwrap();
            dir
        }

        fn controller_for(
            engine: &Arc<ProcessDecodeEngine>,
            root: &Path,
        ) -> Arc<PlaybackController> {
            Arc::new(PlaybackController::with_source(
                Arc::new(LocalSource::mount(root.to_path_buf())),
                engine.clone(),
                Arc::new(NoopStateEmitter),
                PlaybackSettings {
                    default_category: Some("rock".into()),
                    ..Default::default()
                },
            ))
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn zero_volume_leaves_playback_recoverable() {
            let dir = library();
            let engine = Arc::new(engine_with(&["sleep", "30"]));
            let controller = controller_for(&engine, dir.path());
            controller.start().await;
            assert!(engine.is_busy());

            controller.request_volume("0").unwrap();
            assert!(engine.is_busy());

            controller.request_volume("12").unwrap();
            controller.request_state_change("on").unwrap();

            let state = controller.state();
            assert!(state.requested_on);
            assert_eq!(state.phase, PlaybackPhase::Playing);
            assert!(engine.is_busy());
        }

        #[cfg(unix)]
        #[tokio::test]
        async fn track_ending_while_off_is_replaced_on_next_on() {
            let dir = library();
            let engine = Arc::new(engine_with(&["sleep", "0.2"]));
            let controller = controller_for(&engine, dir.path());
            let playback = PlaybackLoop::new(controller.clone(), Duration::from_millis(1));
            controller.start().await;

            controller.request_state_change("off").unwrap();
            assert!(engine.is_busy());

            let stopped = (0..5000).any(|_| {
                playback.tick();
                controller.state().phase == PlaybackPhase::Stopped
            });
            assert!(stopped);
            assert!(!engine.is_busy());

            controller.request_state_change("on").unwrap();
            assert_eq!(controller.state().phase, PlaybackPhase::Playing);
            assert!(engine.is_busy());
        }
    }
}
