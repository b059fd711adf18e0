//! Server configuration file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ha_config_entries::{ConfigEntry, ConfigEntrySource};
use ha_plugwise::consts::{CONF_SCAN_INTERVAL, DOMAIN};
use ha_plugwise::SmileType;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top level of `configuration.yaml`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub plugwise: PlugwiseSection,
    /// Default tracing filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The `plugwise:` block
///
/// Connection settings (`host`, `port`, `username`, `password`) are not
/// interpreted here; they become the config entry's data as written and are
/// validated and defaulted when the integration is set up.
#[derive(Clone, Deserialize)]
pub struct PlugwiseSection {
    /// JSON snapshot served in place of a live gateway, relative to the config file
    pub fixture: PathBuf,
    #[serde(default)]
    pub smile_type: SmileType,
    /// Poll interval override in seconds
    #[serde(default)]
    pub scan_interval: Option<u64>,
    #[serde(flatten)]
    pub connection: HashMap<String, Value>,
}

impl std::fmt::Debug for PlugwiseSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlugwiseSection")
            .field("host", &self.host())
            .field("fixture", &self.fixture)
            .field("smile_type", &self.smile_type)
            .field("scan_interval", &self.scan_interval)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: ServerConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: e,
            })?;

        if config.plugwise.fixture.is_relative() {
            if let Some(dir) = path.parent() {
                config.plugwise.fixture = dir.join(&config.plugwise.fixture);
            }
        }
        Ok(config)
    }
}

impl PlugwiseSection {
    pub fn host(&self) -> Option<&str> {
        self.connection.get("host").and_then(Value::as_str)
    }

    /// Config entry equivalent to a YAML import of this block
    pub fn to_config_entry(&self) -> ConfigEntry {
        let mut options = HashMap::new();
        if let Some(secs) = self.scan_interval {
            options.insert(CONF_SCAN_INTERVAL.to_string(), json!(secs));
        }

        let host = self.host().unwrap_or("unknown host");
        let mut entry = ConfigEntry::new(DOMAIN, format!("Smile {}", host))
            .with_data(self.connection.clone())
            .with_options(options)
            .with_source(ConfigEntrySource::Import);
        if let Some(host) = self.host() {
            entry = entry.with_unique_id(host);
        }
        entry
    }
}
