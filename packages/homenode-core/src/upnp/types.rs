//! Shared types for media server discovery and browsing.

use thiserror::Error;

/// Errors that can occur during media server discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to bind UDP socket for discovery.
    #[error("failed to bind UDP socket: {0}")]
    SocketBind(#[source] std::io::Error),

    /// No usable network interfaces found.
    #[error("no usable network interfaces found")]
    NoInterfaces,

    /// The discovery round finished without any media server answering.
    #[error("no media server responded")]
    NoServers,

    /// A device answered but its description could not be used.
    #[error("device description unusable: {0}")]
    Description(String),
}

/// Convenient Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// A UPnP media server exposing a ContentDirectory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaServer {
    /// Friendly name from the device description.
    pub friendly_name: String,
    /// Unique device name (`uuid:...`).
    pub udn: String,
    /// Base URL used to resolve relative URLs (`http://host:port`).
    pub base_url: String,
    /// Absolute ContentDirectory control URL.
    pub control_url: String,
}

/// One entry returned by a ContentDirectory `Browse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryObject {
    /// Object id, used to browse into containers.
    pub id: String,
    /// `dc:title` of the object.
    pub title: String,
    /// True for containers (directories).
    pub is_container: bool,
    /// First resource URI of an item. Containers have none.
    pub uri: Option<String>,
}

impl DirectoryObject {
    /// Creates a container entry.
    pub fn container(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_container: true,
            uri: None,
        }
    }

    /// Creates an item entry.
    pub fn item(id: impl Into<String>, title: impl Into<String>, uri: Option<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_container: false,
            uri,
        }
    }
}
