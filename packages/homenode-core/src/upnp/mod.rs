//! UPnP media server discovery and browsing.
//!
//! # Module Structure
//!
//! - `types` - Media server and directory object types
//! - `ssdp` - SSDP multicast search for media servers
//! - `description` - Device description parsing
//! - `soap` - Low-level SOAP protocol implementation
//! - `content_directory` - `Browse` requests and DIDL-Lite parsing
//! - `traits` - Trait abstractions for testability
//! - `client` - `UpnpClient` network implementation
//! - `utils` - Shared XML and URL helpers

pub mod client;
pub mod content_directory;
pub mod description;
pub(crate) mod retry;
pub mod soap;
pub mod ssdp;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use client::UpnpClient;
pub use traits::{ContentDirectory, MediaServerDiscovery};
pub use types::{DirectoryObject, DiscoveryError, MediaServer};
