//! Plugwise config entry data

use std::time::Duration;

use ha_config_entries::ConfigEntry;
use serde::Deserialize;

use crate::api::SmileType;
use crate::consts::{CONF_SCAN_INTERVAL, DEFAULT_PORT, DEFAULT_USERNAME};

/// Connection settings stored in a config entry's `data`
#[derive(Clone, Deserialize)]
pub struct PlugwiseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    /// Smile ID printed on the gateway
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

impl std::fmt::Debug for PlugwiseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlugwiseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl PlugwiseConfig {
    pub fn from_entry(entry: &ConfigEntry) -> Result<Self, serde_json::Error> {
        serde_json::from_value(entry.data_value())
    }
}

/// Poll interval: the `scan_interval` option (seconds) or the Smile type's default
pub fn scan_interval(entry: &ConfigEntry, smile_type: SmileType) -> Duration {
    entry
        .option::<u64>(CONF_SCAN_INTERVAL)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| smile_type.default_scan_interval())
}
