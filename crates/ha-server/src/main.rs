//! Home Assistant Rust Server
//!
//! Loads `configuration.yaml`, sets up the Plugwise integration against a
//! fixture-backed Smile and logs number states whenever the data changes.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use ha_core::NumberPlatform;
use ha_plugwise::{async_setup_integration, FixtureSmile};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::ServerConfig;

const DEFAULT_CONFIG_PATH: &str = "configuration.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ServerConfig::load(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Home Assistant (Rust)");
    debug!("Loaded configuration from {}: {:?}", path, config);

    let smile = FixtureSmile::from_file(config.plugwise.smile_type, &config.plugwise.fixture)
        .await
        .context("failed to load Smile fixture")?;
    let platform = Arc::new(NumberPlatform::new(ha_plugwise::consts::DOMAIN));
    let mut entry = config.plugwise.to_config_entry();

    let coordinator = async_setup_integration(&mut entry, Arc::new(smile), &platform).await?;
    log_states(&platform);

    let mut updates = coordinator.subscribe();
    let watched = Arc::clone(&platform);
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            log_states(&watched);
        }
    });

    info!("Home Assistant is running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    coordinator.shutdown();
    watcher.abort();

    Ok(())
}

fn log_states(platform: &NumberPlatform) {
    for state in platform.states() {
        info!("{} = {}", state.entity_id, state.state);
    }
}
