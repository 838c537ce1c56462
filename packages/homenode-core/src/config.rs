//! Player configuration.
//!
//! All fields have sensible defaults so a config file only needs to name what
//! differs from a stock audio node.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};
use crate::protocol_constants::{AMPLIFIER_MAX_VOLUME, DEFAULT_VOLUME};
use crate::router::transport::QosLevel;
use crate::source::retry::RetryPolicy;
use crate::source::SourceKind;
use crate::upnp::ssdp::SsdpConfig;

/// Topics the audio node listens and publishes on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TopicConfig {
    /// Inbound `on` / `off` requests.
    pub change_state: String,
    /// Inbound volume requests (decimal integer payload).
    pub change_volume: String,
    /// Inbound genre (category) change requests.
    pub change_genre: String,
    /// Outbound state snapshots.
    pub state_changed: String,
    /// QoS used when subscribing to the inbound topics.
    pub qos: QosLevel,
    /// Whether state snapshots are published with the retain flag.
    pub retain_state: bool,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            change_state: "home/audio_player/state/set".to_string(),
            change_volume: "home/audio_player/volume/set".to_string(),
            change_genre: "home/audio_player/genre/set".to_string(),
            state_changed: "home/audio_player/state".to_string(),
            qos: QosLevel::AtLeastOnce,
            retain_state: false,
        }
    }
}

/// Configuration for media server discovery and browsing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Number of M-SEARCH packets to send per discovery round.
    pub ssdp_send_count: u64,

    /// Delay between M-SEARCH packets (milliseconds).
    pub ssdp_retry_delay_ms: u64,

    /// How long one discovery round listens for replies (milliseconds).
    pub ssdp_timeout_ms: u64,

    /// MX value (max response delay in seconds) advertised in M-SEARCH.
    pub ssdp_mx: u64,

    /// Discovery rounds before giving up. `None` retries until a server answers.
    pub max_attempts: Option<u32>,

    /// Delay before the second discovery round (milliseconds), doubled each round.
    pub initial_backoff_ms: u64,

    /// Upper bound on the delay between discovery rounds (milliseconds).
    pub max_backoff_ms: u64,

    /// Objects requested per `Browse` call.
    pub browse_page_size: u32,

    /// Timeout for HTTP requests to the media server (seconds).
    pub http_timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ssdp_send_count: 3,
            ssdp_retry_delay_ms: 800,
            ssdp_timeout_ms: 3000,
            ssdp_mx: 1,
            max_attempts: None,
            initial_backoff_ms: 200,
            max_backoff_ms: 5000,
            browse_page_size: 100,
            http_timeout_secs: 10,
        }
    }
}

impl DiscoveryConfig {
    /// SSDP settings for a single discovery round.
    pub fn ssdp(&self) -> SsdpConfig {
        SsdpConfig {
            send_count: self.ssdp_send_count,
            retry_delay: Duration::from_millis(self.ssdp_retry_delay_ms),
            discovery_timeout: Duration::from_millis(self.ssdp_timeout_ms),
            mx_value: self.ssdp_mx,
        }
    }

    /// Retry policy wrapped around discovery rounds.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// Configuration for the audio player node.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Where the catalog comes from.
    pub source: SourceKind,

    /// Volume applied at boot.
    pub default_volume: u8,

    /// Highest accepted volume.
    pub max_volume: u8,

    /// Category selected after enumeration.
    pub default_category: Option<String>,

    /// Sleep of the playback loop while the engine is idle (milliseconds).
    pub idle_delay_ms: u64,

    /// Remote source discovery and browsing.
    pub discovery: DiscoveryConfig,

    /// Messaging topics.
    pub topics: TopicConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Local {
                root: PathBuf::from("/media/sd"),
            },
            default_volume: DEFAULT_VOLUME,
            max_volume: AMPLIFIER_MAX_VOLUME,
            default_category: None,
            idle_delay_ms: 1000,
            discovery: DiscoveryConfig::default(),
            topics: TopicConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Configuration`] for values that would misbehave at
    /// runtime.
    pub fn validate(&self) -> NodeResult<()> {
        if self.max_volume == 0 {
            return Err(NodeError::Configuration("max_volume must be >= 1".into()));
        }
        if self.default_volume > self.max_volume {
            return Err(NodeError::Configuration(format!(
                "default_volume {} exceeds max_volume {}",
                self.default_volume, self.max_volume
            )));
        }
        if self.discovery.browse_page_size == 0 {
            return Err(NodeError::Configuration(
                "discovery.browse_page_size must be >= 1".into(),
            ));
        }
        if self.discovery.max_attempts == Some(0) {
            return Err(NodeError::Configuration(
                "discovery.max_attempts must be >= 1 (omit it to retry forever)".into(),
            ));
        }
        let topics = &self.topics;
        for (name, topic) in [
            ("change_state", &topics.change_state),
            ("change_volume", &topics.change_volume),
            ("change_genre", &topics.change_genre),
            ("state_changed", &topics.state_changed),
        ] {
            if topic.is_empty() {
                return Err(NodeError::Configuration(format!(
                    "topics.{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Idle sleep of the playback loop.
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }
}
