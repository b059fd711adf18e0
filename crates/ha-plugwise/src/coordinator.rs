//! Plugwise data update coordinator

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ha_update_coordinator::{ConfigEntryNotReady, DataUpdateCoordinator, UpdateFailed, UpdateMethod};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{PlugwiseData, SmileApi};
use crate::consts::DOMAIN;

/// Fetches snapshots through the Smile API
struct SmileUpdater {
    api: Arc<dyn SmileApi>,
}

#[async_trait]
impl UpdateMethod<PlugwiseData> for SmileUpdater {
    async fn async_update_data(&self) -> Result<PlugwiseData, UpdateFailed> {
        self.api.async_update().await.map_err(UpdateFailed::from)
    }
}

/// Coordinator for one Smile: the polled snapshot plus the API handle
/// entities use to write back
pub struct PlugwiseDataUpdateCoordinator {
    inner: Arc<DataUpdateCoordinator<PlugwiseData>>,
    api: Arc<dyn SmileApi>,
}

impl PlugwiseDataUpdateCoordinator {
    pub fn new(api: Arc<dyn SmileApi>, update_interval: Duration) -> Self {
        Self::from_coordinator(
            DataUpdateCoordinator::new(
                DOMAIN,
                SmileUpdater {
                    api: Arc::clone(&api),
                },
            )
            .with_update_interval(update_interval),
            api,
        )
    }

    /// Same as [`new`](Self::new) with a custom refresh-request cooldown
    pub fn with_request_refresh_cooldown(
        api: Arc<dyn SmileApi>,
        update_interval: Duration,
        cooldown: Duration,
    ) -> Self {
        Self::from_coordinator(
            DataUpdateCoordinator::new(
                DOMAIN,
                SmileUpdater {
                    api: Arc::clone(&api),
                },
            )
            .with_update_interval(update_interval)
            .with_request_refresh_cooldown(cooldown),
            api,
        )
    }

    fn from_coordinator(
        coordinator: DataUpdateCoordinator<PlugwiseData>,
        api: Arc<dyn SmileApi>,
    ) -> Self {
        Self {
            inner: Arc::new(coordinator),
            api,
        }
    }

    /// Handle passed to descriptor commands
    pub fn api(&self) -> &Arc<dyn SmileApi> {
        &self.api
    }

    /// Latest snapshot, `None` before the first successful refresh
    pub fn data(&self) -> Option<Arc<PlugwiseData>> {
        self.inner.data()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success()
    }

    pub fn update_interval(&self) -> Option<Duration> {
        self.inner.update_interval()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<PlugwiseData>>> {
        self.inner.subscribe()
    }

    pub async fn async_refresh(&self) {
        self.inner.async_refresh().await;
    }

    pub async fn async_request_refresh(&self) {
        self.inner.async_request_refresh().await;
    }

    pub async fn async_config_entry_first_refresh(&self) -> Result<(), ConfigEntryNotReady> {
        self.inner.async_config_entry_first_refresh().await
    }

    pub fn start(&self) -> Option<JoinHandle<()>> {
        self.inner.start()
    }

    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}
