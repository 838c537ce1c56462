//! Player configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use homenode_core::SourceKind;
use serde::Deserialize;

/// MQTT broker connection settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or IP.
    /// Override: `HOMENODE_MQTT_HOST`
    pub host: String,

    /// Broker port.
    /// Override: `HOMENODE_MQTT_PORT`
    pub port: u16,

    /// Client identifier presented to the broker.
    pub client_id: String,

    /// Override: `HOMENODE_MQTT_USERNAME`
    pub username: Option<String>,

    /// Override: `HOMENODE_MQTT_PASSWORD`
    pub password: Option<String>,

    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,

    /// Delay before reconnecting after a connection error (milliseconds).
    pub reconnect_delay_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "homenode-audio-player".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 30,
            reconnect_delay_ms: 2000,
        }
    }
}

/// External player process settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Command line of the player. `{uri}` is replaced by the track path or
    /// URL, `{volume}` by the volume scaled to 0-100 and `{position}` by the
    /// start offset in seconds. A volume change restarts the current track
    /// from the position reached, so without `{position}` it starts over.
    pub command: Vec<String>,

    /// Sleep between process polls while a track is playing (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: [
                "ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet", "-ss", "{position}",
                "-volume", "{volume}", "{uri}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            poll_interval_ms: 100,
        }
    }
}

/// Player configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PlayerConfig {
    pub mqtt: MqttConfig,
    pub engine: EngineConfig,
    /// Playback core settings (source, volume, topics, discovery).
    pub node: homenode_core::Config,
}

impl PlayerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies `HOMENODE_*` overrides looked up through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("HOMENODE_MQTT_HOST") {
            self.mqtt.host = host;
        }

        if let Some(port) = var("HOMENODE_MQTT_PORT").and_then(|v| v.parse().ok()) {
            self.mqtt.port = port;
        }

        if let Some(username) = var("HOMENODE_MQTT_USERNAME") {
            self.mqtt.username = Some(username);
        }

        if let Some(password) = var("HOMENODE_MQTT_PASSWORD") {
            self.mqtt.password = Some(password);
        }

        if let Some(category) = var("HOMENODE_DEFAULT_CATEGORY") {
            self.node.default_category = Some(category);
        }

        // Note: HOMENODE_MEDIA_ROOT and HOMENODE_LOG_LEVEL are handled by clap
        // via #[arg(env = ...)] in main.rs
    }

    /// Switches to a local source rooted at `root`.
    pub fn use_local_root(&mut self, root: PathBuf) {
        self.node.source = SourceKind::Local { root };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn yaml_sections_fill_defaults() {
        let config = PlayerConfig::from_yaml(
            r#"
mqtt:
  host: broker.lan
node:
  source:
    kind: remote
  default_category: rock
  topics:
    qos: 0
"#,
        )
        .unwrap();

        assert_eq!(config.mqtt.host, "broker.lan");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.node.source, SourceKind::Remote);
        assert_eq!(config.node.default_category.as_deref(), Some("rock"));
        assert_eq!(config.node.topics.qos, homenode_core::QosLevel::AtMostOnce);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = PlayerConfig::default();
        let env: HashMap<&str, &str> = [
            ("HOMENODE_MQTT_HOST", "10.0.0.2"),
            ("HOMENODE_MQTT_PORT", "8883"),
            ("HOMENODE_DEFAULT_CATEGORY", "jazz"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.mqtt.host, "10.0.0.2");
        assert_eq!(config.mqtt.port, 8883);
        assert_eq!(config.node.default_category.as_deref(), Some("jazz"));
        assert_eq!(config.mqtt.username, None);
    }

    #[test]
    fn unparsable_port_override_is_ignored() {
        let mut config = PlayerConfig::default();
        config.apply_overrides(|key| (key == "HOMENODE_MQTT_PORT").then(|| "lots".to_string()));
        assert_eq!(config.mqtt.port, 1883);
    }
}
