//! Content sources: where the catalog comes from and how a track reaches the
//! decode engine.
//!
//! - [`LocalSource`] walks a mounted storage volume; top-level directories
//!   become categories.
//! - [`RemoteSource`] discovers a UPnP media server and browses its
//!   ContentDirectory into a single uncategorized list.
//!
//! Both degrade the same way: if the volume cannot be mounted or no server
//! answers, `enumerate` yields an empty catalog and the controller's
//! no-op-on-empty policy takes over.

pub mod local;
pub mod remote;
pub mod retry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Track};
use crate::config::DiscoveryConfig;
use crate::decoder::DecodeEngine;
use crate::upnp::UpnpClient;

pub use local::LocalSource;
pub use remote::RemoteSource;
pub use retry::{retry_until_available, RetryPolicy};

/// Which content source variant a node runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Mounted storage volume.
    Local {
        /// Mount point of the volume.
        root: PathBuf,
    },
    /// UPnP/DLNA media server found on the local network.
    Remote,
}

/// Capabilities the playback controller needs from a content source.
///
/// `play`, `pause` and `resume` are called from the transport callback
/// context and the playback loop, so they must not block on I/O.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short name for log records.
    fn name(&self) -> &'static str;

    /// Builds a fresh catalog. Never fails: an unavailable source yields an
    /// empty catalog.
    async fn enumerate(&self) -> Catalog;

    /// Hands a track to the engine and marks the source running.
    ///
    /// Returns `false` if the engine refused the track.
    fn play(&self, track: &Track, engine: &dyn DecodeEngine) -> bool;

    /// Marks the source paused. The engine keeps whatever it buffered.
    fn pause(&self);

    /// Marks the source running again.
    fn resume(&self);

    /// Whether the source considers itself running.
    fn is_running(&self) -> bool;
}

/// Constructs the content source for `kind`.
///
/// Mounting happens here; a failed mount is logged and leaves the source
/// unmounted.
pub fn build_source(
    kind: &SourceKind,
    discovery: &DiscoveryConfig,
    http: reqwest::Client,
) -> Arc<dyn ContentSource> {
    match kind {
        SourceKind::Local { root } => Arc::new(LocalSource::mount(root.clone())),
        SourceKind::Remote => {
            let client = Arc::new(UpnpClient::new(
                http,
                discovery.ssdp(),
                discovery.browse_page_size,
                Duration::from_secs(discovery.http_timeout_secs),
            ));
            Arc::new(RemoteSource::new(
                client.clone(),
                client,
                discovery.retry_policy(),
            ))
        }
    }
}
