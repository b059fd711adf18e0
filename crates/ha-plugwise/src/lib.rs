//! Plugwise Smile integration
//!
//! Polls a Smile gateway through a [`SmileApi`] client and exposes its
//! writable setpoints on the number platform.

pub mod api;
pub mod config;
pub mod consts;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod number;

use std::sync::Arc;

use ha_config_entries::{ConfigEntry, ConfigEntryState};
use ha_core::NumberPlatform;
use tracing::{info, instrument, warn};

pub use api::{DeviceData, FixtureSmile, GatewayData, PlugwiseData, SmileApi, SmileType};
pub use config::PlugwiseConfig;
pub use coordinator::PlugwiseDataUpdateCoordinator;
pub use entity::PlugwiseEntity;
pub use error::{PlugwiseError, PlugwiseResult, SetupError};
pub use number::{PlugwiseNumberEntity, PlugwiseNumberEntityDescription, NUMBER_TYPES};

/// Set up a Plugwise config entry
///
/// Runs the first refresh, forwards the number platform and starts polling
/// unless the entry disables it. If the Smile cannot be reached the entry is
/// left in [`ConfigEntryState::SetupRetry`] and nothing is registered.
#[instrument(skip_all, fields(entry = %entry.entry_id))]
pub async fn async_setup_integration(
    entry: &mut ConfigEntry,
    api: Arc<dyn SmileApi>,
    platform: &Arc<NumberPlatform>,
) -> Result<Arc<PlugwiseDataUpdateCoordinator>, SetupError> {
    let config = match PlugwiseConfig::from_entry(entry) {
        Ok(config) => config,
        Err(e) => {
            entry.set_state(ConfigEntryState::SetupError, Some(e.to_string()));
            return Err(e.into());
        }
    };
    entry.set_state(ConfigEntryState::SetupInProgress, None);

    let interval = config::scan_interval(entry, api.smile_type());
    let coordinator = Arc::new(PlugwiseDataUpdateCoordinator::new(api, interval));

    if let Err(e) = coordinator.async_config_entry_first_refresh().await {
        warn!("Plugwise Smile at {} not ready: {}", config.host, e.source);
        entry.set_state(ConfigEntryState::SetupRetry, Some(e.source.to_string()));
        return Err(e.into());
    }

    number::async_setup_entry(
        Arc::clone(&coordinator),
        entry,
        platform.add_entities_callback(),
    )
    .await;

    if entry.pref_disable_polling {
        info!("Polling disabled for {}", entry.title);
    } else {
        coordinator.start();
    }

    entry.set_state(ConfigEntryState::Loaded, None);
    info!(
        "Plugwise Smile at {} loaded, polling every {:?}",
        config.host, interval
    );
    Ok(coordinator)
}
