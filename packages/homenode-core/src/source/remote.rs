//! Remote media server source.
//!
//! Discovery blocks under the configured [`RetryPolicy`] until a server
//! answers. The first server found is browsed depth-first from the root
//! container and every playable item lands in one uncategorized list.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::retry::{retry_until_available, RetryPolicy};
use super::ContentSource;
use crate::catalog::{Catalog, Track};
use crate::decoder::{DecodeEngine, TrackLocation};
use crate::error::{ErrorCode, NodeError};
use crate::protocol_constants::ROOT_OBJECT_ID;
use crate::upnp::{ContentDirectory, MediaServer, MediaServerDiscovery};

/// Content source backed by a UPnP ContentDirectory.
pub struct RemoteSource {
    discovery: Arc<dyn MediaServerDiscovery>,
    directory: Arc<dyn ContentDirectory>,
    retry: RetryPolicy,
    server: Mutex<Option<MediaServer>>,
    running: AtomicBool,
}

impl RemoteSource {
    pub fn new(
        discovery: Arc<dyn MediaServerDiscovery>,
        directory: Arc<dyn ContentDirectory>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            discovery,
            directory,
            retry,
            server: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// The server chosen by the last successful discovery.
    pub fn server(&self) -> Option<MediaServer> {
        self.server.lock().clone()
    }

    /// Collects every item URI below the root container.
    ///
    /// Items of a container come before the contents of its child
    /// containers. Containers already visited are skipped.
    async fn collect_tracks(&self, server: &MediaServer) -> Vec<Track> {
        let mut tracks = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending = vec![ROOT_OBJECT_ID.to_string()];

        while let Some(object_id) = pending.pop() {
            if !visited.insert(object_id.clone()) {
                log::debug!("[RemoteSource] Container {} already visited", object_id);
                continue;
            }

            let children = match self.directory.browse(server, &object_id).await {
                Ok(children) => children,
                Err(e) => {
                    log::warn!(
                        "[RemoteSource] Browse {} failed [{}]: {}",
                        object_id,
                        e.code(),
                        e
                    );
                    continue;
                }
            };

            let mut containers = Vec::new();
            for child in children {
                if child.is_container {
                    containers.push(child.id);
                } else if let Some(uri) = child.uri {
                    tracks.push(Track::new(uri));
                } else {
                    log::debug!("[RemoteSource] Item {} has no resource, skipped", child.id);
                }
            }

            // Reversed so the first child container is browsed next
            pending.extend(containers.into_iter().rev());
        }

        tracks
    }
}

#[async_trait]
impl ContentSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn enumerate(&self) -> Catalog {
        let discovery = Arc::clone(&self.discovery);
        let servers = retry_until_available("Media server discovery", &self.retry, || {
            let discovery = Arc::clone(&discovery);
            async move { discovery.discover().await }
        })
        .await;

        let server = match servers {
            Ok(servers) => servers.into_iter().next(),
            Err(e) => {
                let err = NodeError::from(e);
                log::warn!("[RemoteSource] {} [{}]", err, err.code());
                None
            }
        };
        let Some(server) = server else {
            return Catalog::new();
        };

        log::info!(
            "[RemoteSource] Browsing '{}' ({})",
            server.friendly_name,
            server.base_url
        );
        *self.server.lock() = Some(server.clone());

        let tracks = self.collect_tracks(&server).await;
        log::info!("[RemoteSource] Enumerated {} tracks", tracks.len());
        Catalog::from_flat(tracks)
    }

    fn play(&self, track: &Track, engine: &dyn DecodeEngine) -> bool {
        let location = TrackLocation::Url(track.as_str().to_string());
        if engine.connect_to_source(&location) {
            self.running.store(true, Ordering::SeqCst);
            true
        } else {
            log::warn!("[RemoteSource] Engine refused {}", track);
            false
        }
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
