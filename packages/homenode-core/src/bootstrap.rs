//! Service bootstrap and dependency wiring for the audio player node.
//!
//! This is the composition root: the transport and decode engine come from
//! the device, everything else is built here in dependency order.
//!
//! 1. Shared HTTP client (media server description + SOAP)
//! 2. State emitter publishing to the state topic
//! 3. Playback controller with its content source
//! 4. Action router bound to the control topics

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::decoder::DecodeEngine;
use crate::error::{NodeError, NodeResult};
use crate::events::StateEmitter;
use crate::playback::{PlaybackController, PlaybackLoop};
use crate::router::{on_off_action, ActionRouter, TopicStateEmitter, Transport};

/// Container for all player services.
pub struct PlayerServices {
    pub controller: Arc<PlaybackController>,
    pub router: Arc<ActionRouter>,
    pub transport: Arc<dyn Transport>,
    /// Cancellation token for the playback loop.
    pub cancel_token: CancellationToken,
    http_client: Client,
    idle_delay: Duration,
    playback_thread: Mutex<Option<JoinHandle<()>>>,
}

impl PlayerServices {
    /// Returns the shared HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Connects the transport, enumerates the catalog, starts playback and
    /// spawns the playback loop.
    ///
    /// # Errors
    /// Returns an error if the transport refuses to connect or the loop
    /// thread cannot be spawned.
    pub async fn start(&self) -> NodeResult<()> {
        self.transport.connect()?;
        self.controller.start().await;

        let playback = PlaybackLoop::new(Arc::clone(&self.controller), self.idle_delay);
        let handle = playback
            .spawn(self.cancel_token.clone())
            .map_err(|e| NodeError::Configuration(format!("playback loop thread: {}", e)))?;
        *self.playback_thread.lock() = Some(handle);

        log::info!("[Bootstrap] Player started");
        Ok(())
    }

    /// Stops the playback loop and hard-stops the engine.
    pub fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning shutdown...");
        self.cancel_token.cancel();

        if let Some(handle) = self.playback_thread.lock().take() {
            if handle.join().is_err() {
                log::error!("[Bootstrap] Playback loop panicked");
            }
        }
        self.controller.engine().stop();

        log::info!("[Bootstrap] Shutdown complete");
    }
}

fn create_http_client(config: &Config) -> NodeResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.discovery.http_timeout_secs))
        .build()
        .map_err(|e| NodeError::Configuration(format!("HTTP client: {}", e)))
}

/// Binds the control topics to the controller.
///
/// Every (re)connect also republishes the full state, since snapshots
/// emitted while disconnected are dropped.
pub fn bind_player_actions(
    transport: Arc<dyn Transport>,
    controller: &Arc<PlaybackController>,
    config: &Config,
) -> Arc<ActionRouter> {
    let topics = &config.topics;

    let on = Arc::clone(controller);
    let off = Arc::clone(controller);
    let volume = Arc::clone(controller);
    let genre = Arc::clone(controller);
    let republish = Arc::clone(controller);

    ActionRouter::builder(transport)
        .bind_with_qos(
            topics.change_state.clone(),
            topics.qos,
            on_off_action(move || on.turn_on(), move || off.turn_off()),
        )
        .bind_with_qos(topics.change_volume.clone(), topics.qos, move |payload: &str| {
            volume.request_volume(payload).map(|_| ())
        })
        .bind_with_qos(topics.change_genre.clone(), topics.qos, move |payload: &str| {
            genre.request_category_change(payload)
        })
        .after_connect(move || republish.publish_snapshot())
        .build()
}

/// Wires the player node around a device transport and decode engine.
///
/// # Errors
/// Returns [`NodeError::Configuration`] if the configuration is invalid.
pub fn bootstrap_player(
    config: &Config,
    transport: Arc<dyn Transport>,
    engine: Arc<dyn DecodeEngine>,
) -> NodeResult<PlayerServices> {
    config.validate()?;

    let http_client = create_http_client(config)?;

    let emitter: Arc<dyn StateEmitter> = Arc::new(TopicStateEmitter::new(
        Arc::clone(&transport),
        config.topics.state_changed.clone(),
        config.topics.retain_state,
    ));

    let controller = Arc::new(PlaybackController::initialize(
        &config.source,
        config,
        engine,
        emitter,
        http_client.clone(),
    ));

    let router = bind_player_actions(Arc::clone(&transport), &controller, config);

    Ok(PlayerServices {
        controller,
        router,
        transport,
        cancel_token: CancellationToken::new(),
        http_client,
        idle_delay: config.idle_delay(),
        playback_thread: Mutex::new(None),
    })
}
