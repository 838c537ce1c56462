//! Homenode Player - standalone audio player node.
//!
//! Runs the playback core on a Linux host: control topics arrive over MQTT,
//! tracks come from a local directory or a UPnP media server, and an external
//! player process does the decoding.

mod config;
mod engine;
mod mqtt;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use homenode_core::{bootstrap_player, SourceKind};
use tokio::signal;

use crate::config::PlayerConfig;
use crate::engine::ProcessDecodeEngine;
use crate::mqtt::MqttTransport;

/// Homenode Player - MQTT-controlled audio player node.
#[derive(Parser, Debug)]
#[command(name = "homenode-player")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "HOMENODE_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// MQTT broker host (overrides config file).
    #[arg(short = 'm', long, env = "HOMENODE_MQTT_HOST")]
    mqtt_host: Option<String>,

    /// Play from this directory instead of the configured source.
    #[arg(short = 'r', long, env = "HOMENODE_MEDIA_ROOT", conflicts_with = "remote")]
    media_root: Option<PathBuf>,

    /// Play from a UPnP media server on the local network.
    #[arg(long)]
    remote: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Homenode Player v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(host) = args.mqtt_host {
        config.mqtt.host = host;
    }
    if let Some(root) = args.media_root {
        config.use_local_root(root);
    }
    if args.remote {
        config.node.source = SourceKind::Remote;
    }

    match &config.node.source {
        SourceKind::Local { root } => log::info!(
            "Configuration: broker={}:{}, source=local ({})",
            config.mqtt.host,
            config.mqtt.port,
            root.display()
        ),
        SourceKind::Remote => log::info!(
            "Configuration: broker={}:{}, source=remote",
            config.mqtt.host,
            config.mqtt.port
        ),
    }

    let transport = Arc::new(MqttTransport::new(&config.mqtt, config.node.topics.qos));
    let engine = Arc::new(ProcessDecodeEngine::new(
        &config.engine,
        config.node.max_volume,
    ));

    let services = bootstrap_player(&config.node, transport.clone(), engine)
        .context("Failed to bootstrap player")?;
    services
        .start()
        .await
        .context("Failed to start player")?;

    log::info!("Player running");

    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");

    // The playback thread joins synchronously
    let shutdown = tokio::task::spawn_blocking(move || services.shutdown());
    if let Err(e) = shutdown.await {
        log::error!("Player shutdown failed: {}", e);
    }
    transport.shutdown();

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
