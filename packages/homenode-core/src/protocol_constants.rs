//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by external specifications (UPnP, SSDP) or by the
//! amplifier hardware the nodes ship with. Tunables live in [`crate::config`].

// ─────────────────────────────────────────────────────────────────────────────
// SSDP / UPnP
// ─────────────────────────────────────────────────────────────────────────────

/// Standard SSDP multicast address and port (protocol specification).
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// SSDP search target for UPnP AV media servers.
pub const MEDIA_SERVER_SEARCH_TARGET: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// Service type prefix of the ContentDirectory service.
///
/// Matched as a prefix so that both `:1` and later versions are accepted.
pub const CONTENT_DIRECTORY_SERVICE_PREFIX: &str = "urn:schemas-upnp-org:service:ContentDirectory:";

/// Service URN used for `Browse` SOAP actions.
pub const CONTENT_DIRECTORY_URN: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";

/// Object id of the ContentDirectory root container.
pub const ROOT_OBJECT_ID: &str = "0";

/// Receive buffer for a single SSDP response datagram.
pub const SSDP_RECV_BUFFER_BYTES: usize = 2048;

// ─────────────────────────────────────────────────────────────────────────────
// Audio hardware
// ─────────────────────────────────────────────────────────────────────────────

/// Highest volume step of the I2S amplifier the audio node drives (0-21).
pub const AMPLIFIER_MAX_VOLUME: u8 = 21;

/// Volume the amplifier is set to at boot.
pub const DEFAULT_VOLUME: u8 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Messaging
// ─────────────────────────────────────────────────────────────────────────────

/// Largest inbound message the router will reassemble from fragments.
///
/// Control payloads are a few bytes; anything bigger is not ours.
pub const MAX_REASSEMBLED_MESSAGE_BYTES: usize = 64 * 1024;

/// Longest accepted category (genre) name in bytes.
pub const MAX_CATEGORY_NAME_BYTES: usize = 256;
