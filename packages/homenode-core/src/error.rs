//! Centralized error types for the Homenode core library.
//!
//! Protocol-level failures keep their own `thiserror` enums next to the code
//! that produces them ([`DiscoveryError`], [`SoapError`], [`TransportError`]).
//! Everything a caller of the playback core can observe is folded into
//! [`NodeError`], whose variants mirror the failure taxonomy of the node:
//! nothing here is fatal, every error ends up as a logged no-op.

use thiserror::Error;

use crate::router::transport::TransportError;
use crate::upnp::soap::SoapError;
use crate::upnp::types::DiscoveryError;

/// Trait for error types that provide machine-readable error codes.
///
/// Codes are stable strings used in log records so that failures can be
/// grepped for regardless of the human-readable message.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::SocketBind(_) => "socket_bind_failed",
            Self::NoInterfaces => "no_network_interfaces",
            Self::NoServers => "no_media_servers",
            Self::Description(_) => "device_description_failed",
        }
    }
}

impl ErrorCode for SoapError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Fault(_) => "soap_fault",
            Self::Parse => "soap_parse_error",
        }
    }
}

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::Disconnected => "transport_disconnected",
            Self::Rejected(_) => "transport_rejected",
        }
    }
}

/// Node-wide error type for the playback core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A control payload could not be interpreted (malformed volume or category).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A state-change payload was neither `on` nor `off`.
    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    /// Discovery or mount failed; the content source yields an empty catalog.
    #[error("Content source unavailable: {0}")]
    SourceUnavailable(String),

    /// Publish or subscribe attempted while the transport is down.
    #[error("Transport disconnected: {0}")]
    TransportDisconnected(String),

    /// Configuration values that cannot be used.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ErrorCode for NodeError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnrecognizedCommand(_) => "unrecognized_command",
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::TransportDisconnected(_) => "transport_disconnected",
            Self::Configuration(_) => "configuration_error",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::router::transport::TransportResult;
pub use crate::upnp::soap::SoapResult;
pub use crate::upnp::types::DiscoveryResult;

/// Convenient Result alias for node-wide operations.
pub type NodeResult<T> = Result<T, NodeError>;

impl From<DiscoveryError> for NodeError {
    fn from(err: DiscoveryError) -> Self {
        Self::SourceUnavailable(err.to_string())
    }
}

impl From<SoapError> for NodeError {
    fn from(err: SoapError) -> Self {
        Self::SourceUnavailable(err.to_string())
    }
}

impl From<TransportError> for NodeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Disconnected => Self::TransportDisconnected(err.to_string()),
            TransportError::Rejected(msg) => Self::TransportDisconnected(msg),
        }
    }
}
