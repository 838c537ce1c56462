//! Trait abstractions for media server operations.
//!
//! The remote content source depends on these rather than on the network
//! client, so discovery and browsing can be faked in tests.

use async_trait::async_trait;

use super::soap::SoapResult;
use super::types::{DirectoryObject, DiscoveryResult, MediaServer};

/// Finds media servers on the local network.
#[async_trait]
pub trait MediaServerDiscovery: Send + Sync {
    /// Runs one discovery round.
    ///
    /// # Errors
    /// Returns [`DiscoveryError::NoServers`](super::types::DiscoveryError::NoServers)
    /// when nothing usable answered.
    async fn discover(&self) -> DiscoveryResult<Vec<MediaServer>>;
}

/// Lists the children of a ContentDirectory object.
#[async_trait]
pub trait ContentDirectory: Send + Sync {
    /// Returns every direct child of `object_id`, in server order.
    async fn browse(&self, server: &MediaServer, object_id: &str)
        -> SoapResult<Vec<DirectoryObject>>;
}
