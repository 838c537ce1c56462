//! Fakes shared by the unit tests.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::catalog::{Catalog, Track};
use crate::decoder::{DecodeEngine, DecodeEvent, TrackLocation};
use crate::events::{StateEmitter, StateSnapshot};
use crate::router::transport::{
    ConnectCallback, InboundMessage, MessageCallback, QosLevel, Transport, TransportResult,
};
use crate::source::ContentSource;

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// Records subscribe/publish calls and lets tests fire the callbacks.
#[derive(Default)]
pub struct FakeTransport {
    connected: AtomicBool,
    defer_connect: AtomicBool,
    subscriptions: Mutex<Vec<(String, QosLevel)>>,
    published: Mutex<Vec<(String, String, bool)>>,
    on_connect: Mutex<Option<ConnectCallback>>,
    on_message: Mutex<Option<MessageCallback>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `connect` return without connecting, like a broker that has
    /// not acknowledged yet. Tests finish it with [`Self::simulate_connect`].
    pub fn defer_connect(&self, defer: bool) {
        self.defer_connect.store(defer, Ordering::SeqCst);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn subscriptions(&self) -> Vec<(String, QosLevel)> {
        self.subscriptions.lock().clone()
    }

    pub fn published(&self) -> Vec<(String, String, bool)> {
        self.published.lock().clone()
    }

    /// Marks the transport connected and fires the connect callback.
    pub fn simulate_connect(&self, session_present: bool) {
        self.set_connected(true);
        let callback = self.on_connect.lock().clone();
        if let Some(callback) = callback {
            callback(session_present);
        }
    }

    pub fn simulate_message(&self, msg: InboundMessage) {
        let callback = self.on_message.lock().clone();
        if let Some(callback) = callback {
            callback(msg);
        }
    }
}

impl Transport for FakeTransport {
    fn connect(&self) -> TransportResult<()> {
        if !self.defer_connect.load(Ordering::SeqCst) {
            self.simulate_connect(false);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self, topic: &str, qos: QosLevel) -> TransportResult<()> {
        self.subscriptions.lock().push((topic.to_string(), qos));
        Ok(())
    }

    fn publish(&self, topic: &str, payload: &str, retain: bool) -> TransportResult<()> {
        self.published
            .lock()
            .push((topic.to_string(), payload.to_string(), retain));
        Ok(())
    }

    fn on_connect(&self, callback: ConnectCallback) {
        *self.on_connect.lock() = Some(callback);
    }

    fn on_message(&self, callback: MessageCallback) {
        *self.on_message.lock() = Some(callback);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode engine
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct EngineState {
    volume: u8,
    busy: bool,
    refuse: bool,
    locations: Vec<TrackLocation>,
    stops: usize,
    queued: VecDeque<Vec<DecodeEvent>>,
}

/// Engine that records what it was asked to do.
///
/// Connecting makes it busy, stopping or reporting a track end makes it idle.
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<EngineState>,
}

fn location_string(location: &TrackLocation) -> String {
    match location {
        TrackLocation::File(path) => path.to_string_lossy().into_owned(),
        TrackLocation::Url(url) => url.clone(),
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self) -> u8 {
        self.state.lock().volume
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().locations.len()
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().stops
    }

    pub fn last_location(&self) -> Option<TrackLocation> {
        self.state.lock().locations.last().cloned()
    }

    pub fn last_track(&self) -> Option<String> {
        self.state.lock().locations.last().map(location_string)
    }

    pub fn history(&self) -> Vec<String> {
        self.state.lock().locations.iter().map(location_string).collect()
    }

    pub fn set_busy(&self, busy: bool) {
        self.state.lock().busy = busy;
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.state.lock().refuse = refuse;
    }

    /// Queues the events returned by the next `step_decode`.
    pub fn push_events(&self, events: Vec<DecodeEvent>) {
        self.state.lock().queued.push_back(events);
    }
}

impl DecodeEngine for FakeEngine {
    fn set_volume(&self, volume: u8) {
        self.state.lock().volume = volume;
    }

    fn connect_to_source(&self, location: &TrackLocation) -> bool {
        let mut state = self.state.lock();
        if state.refuse {
            return false;
        }
        state.locations.push(location.clone());
        state.busy = true;
        true
    }

    fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    fn step_decode(&self) -> Vec<DecodeEvent> {
        let mut state = self.state.lock();
        let events = state.queued.pop_front().unwrap_or_default();
        if events.contains(&DecodeEvent::TrackEnded) {
            state.busy = false;
        }
        events
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.stops += 1;
        state.busy = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Content source
// ─────────────────────────────────────────────────────────────────────────────

/// Source serving a fixed catalog; tracks are handed over as files.
pub struct FakeSource {
    catalog: Catalog,
    running: AtomicBool,
}

impl FakeSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            running: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn enumerate(&self) -> Catalog {
        self.catalog.clone()
    }

    fn play(&self, track: &Track, engine: &dyn DecodeEngine) -> bool {
        let ok = engine.connect_to_source(&TrackLocation::File(PathBuf::from(track.as_str())));
        if ok {
            self.running.store(true, Ordering::SeqCst);
        }
        ok
    }

    fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Emitter
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps every emitted snapshot.
#[derive(Default)]
pub struct RecordingEmitter {
    snapshots: Mutex<Vec<StateSnapshot>>,
}

impl RecordingEmitter {
    pub fn snapshots(&self) -> Vec<StateSnapshot> {
        self.snapshots.lock().clone()
    }

    pub fn last(&self) -> Option<StateSnapshot> {
        self.snapshots.lock().last().cloned()
    }
}

impl StateEmitter for RecordingEmitter {
    fn emit_state(&self, snapshot: &StateSnapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }
}
