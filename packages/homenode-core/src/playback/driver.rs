//! The playback loop: advances the decode engine and feeds its events back
//! into the controller.
//!
//! Runs on its own thread, separate from the transport callbacks. While the
//! engine is idle the loop sleeps for `idle_delay` between steps.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::controller::PlaybackController;
use crate::decoder::DecodeEvent;

pub struct PlaybackLoop {
    controller: Arc<PlaybackController>,
    idle_delay: Duration,
}

impl PlaybackLoop {
    pub fn new(controller: Arc<PlaybackController>, idle_delay: Duration) -> Self {
        Self {
            controller,
            idle_delay,
        }
    }

    /// Steps the engine once and dispatches what it reported.
    ///
    /// Returns whether the engine is still busy afterwards.
    pub fn tick(&self) -> bool {
        let engine = self.controller.engine();
        for event in engine.step_decode() {
            match event {
                DecodeEvent::TrackEnded => {
                    log::debug!("[PlaybackLoop] Track ended");
                    self.controller.on_track_ended();
                }
                DecodeEvent::Metadata { title } => self.controller.on_track_metadata(&title),
                DecodeEvent::Info(info) => log::trace!("[PlaybackLoop] Engine: {}", info),
            }
        }
        engine.is_busy()
    }

    /// Loops until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        log::info!("[PlaybackLoop] Started");
        while !cancel.is_cancelled() {
            if self.tick() {
                tokio::task::yield_now().await;
                continue;
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.idle_delay) => {}
            }
        }
        log::info!("[PlaybackLoop] Stopped");
    }

    /// Runs the loop on a dedicated OS thread with its own single-threaded
    /// runtime.
    pub fn spawn(self, cancel: CancellationToken) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("playback-loop".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        log::error!("[PlaybackLoop] Failed to build runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(self.run(cancel));
            })
    }
}
