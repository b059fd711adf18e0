//! Smile API client contract and device snapshot types
//!
//! The wire protocol of a real Smile gateway is out of scope here; the
//! integration talks to any [`SmileApi`] implementation. [`FixtureSmile`]
//! serves a snapshot from JSON and applies writes in memory.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{PlugwiseError, PlugwiseResult};

/// Attribute key -> value for one device (numbers and strings)
pub type DeviceData = HashMap<String, Value>;

/// Gateway-level information returned alongside the devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayData {
    /// Device id of the Smile itself
    pub gateway_id: String,
    /// Device id of the boiler/heat pump, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heater_id: Option<String>,
    #[serde(default)]
    pub smile_name: String,
}

/// One full snapshot of a Smile, replaced wholesale on every refresh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlugwiseData {
    pub gateway: GatewayData,
    /// Device id -> attributes, in the order the Smile reported them
    #[serde(default)]
    pub devices: IndexMap<String, DeviceData>,
}

/// Flavour of Smile, which decides the default poll interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmileType {
    Power,
    Stretch,
    #[default]
    Thermostat,
}

impl SmileType {
    pub fn default_scan_interval(&self) -> Duration {
        match self {
            SmileType::Power => Duration::from_secs(10),
            SmileType::Stretch | SmileType::Thermostat => Duration::from_secs(60),
        }
    }
}

/// Client for one Smile gateway
#[async_trait]
pub trait SmileApi: Send + Sync {
    fn smile_type(&self) -> SmileType;

    /// Fetch a full snapshot of all devices
    async fn async_update(&self) -> PlugwiseResult<PlugwiseData>;

    /// Set the maximum boiler temperature setpoint, in °C
    async fn set_max_boiler_temperature(&self, temperature: f64) -> PlugwiseResult<()>;
}

/// Attribute written by [`SmileApi::set_max_boiler_temperature`]
pub const MAX_BOILER_TEMPERATURE: &str = "maximum_boiler_temperature";

/// Smile backed by an in-memory snapshot
///
/// Writes go to the device that carries `maximum_boiler_temperature` and are
/// checked against its `lower_bound`/`upper_bound`.
pub struct FixtureSmile {
    smile_type: SmileType,
    data: RwLock<PlugwiseData>,
}

impl FixtureSmile {
    pub fn new(smile_type: SmileType, data: PlugwiseData) -> Self {
        Self {
            smile_type,
            data: RwLock::new(data),
        }
    }

    /// Build from a JSON document shaped like [`PlugwiseData`]
    pub fn from_value(smile_type: SmileType, value: Value) -> PlugwiseResult<Self> {
        let data: PlugwiseData =
            serde_json::from_value(value).map_err(|e| PlugwiseError::Response(e.to_string()))?;
        Ok(Self::new(smile_type, data))
    }

    /// Load a JSON fixture file
    pub async fn from_file(smile_type: SmileType, path: impl AsRef<Path>) -> PlugwiseResult<Self> {
        let path = path.as_ref();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| PlugwiseError::Fixture {
                    path: path.to_path_buf(),
                    source,
                })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| PlugwiseError::Response(e.to_string()))?;

        let smile = Self::from_value(smile_type, value)?;
        info!(
            "Loaded Smile fixture {:?} with {} devices",
            path,
            smile.data.read().await.devices.len()
        );
        Ok(smile)
    }
}

#[async_trait]
impl SmileApi for FixtureSmile {
    fn smile_type(&self) -> SmileType {
        self.smile_type
    }

    async fn async_update(&self) -> PlugwiseResult<PlugwiseData> {
        Ok(self.data.read().await.clone())
    }

    async fn set_max_boiler_temperature(&self, temperature: f64) -> PlugwiseResult<()> {
        let mut data = self.data.write().await;
        let device = data
            .devices
            .values_mut()
            .find(|device| device.contains_key(MAX_BOILER_TEMPERATURE))
            .ok_or(PlugwiseError::Unsupported(MAX_BOILER_TEMPERATURE))?;

        let bound = |key: &str| device.get(key).and_then(Value::as_f64);
        let min = bound("lower_bound").unwrap_or(f64::MIN);
        let max = bound("upper_bound").unwrap_or(f64::MAX);
        if !(min..=max).contains(&temperature) {
            return Err(PlugwiseError::InvalidSetpoint {
                value: temperature,
                min,
                max,
            });
        }

        device.insert(MAX_BOILER_TEMPERATURE.to_string(), json!(temperature));
        debug!("Maximum boiler temperature set to {}", temperature);
        Ok(())
    }
}
