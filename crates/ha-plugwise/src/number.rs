//! Number platform for Plugwise
//!
//! Each supported control is described once in [`NUMBER_TYPES`]. At setup
//! every device in the coordinator's snapshot is checked for each
//! descriptor's key, and one [`PlugwiseNumberEntity`] is created per match.
//! Devices are not re-scanned later: a key that appears after setup does
//! not produce a new entity until the entry is set up again.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use ha_config_entries::ConfigEntry;
use ha_core::number::{DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE, DEFAULT_STEP};
use ha_core::units::TEMP_CELSIUS;
use ha_core::{
    AddEntitiesCallback, DeviceInfo, Entity, EntityCategory, HomeAssistantError,
    NumberDeviceClass, NumberEntity, NumberMode,
};
use tracing::{debug, info, instrument, warn};

use crate::api::{SmileApi, MAX_BOILER_TEMPERATURE};
use crate::coordinator::PlugwiseDataUpdateCoordinator;
use crate::entity::PlugwiseEntity;
use crate::error::PlugwiseError;

/// Remote write for one control: `(api, new_value) -> outcome`
pub type NumberCommand =
    for<'a> fn(&'a dyn SmileApi, f64) -> BoxFuture<'a, Result<(), PlugwiseError>>;

/// Describes one Plugwise number control
#[derive(Clone, Copy)]
pub struct PlugwiseNumberEntityDescription {
    /// Attribute key; also decides which devices get this control
    pub key: &'static str,
    pub name: &'static str,
    pub device_class: Option<NumberDeviceClass>,
    pub entity_category: Option<EntityCategory>,
    pub native_unit_of_measurement: Option<&'static str>,
    pub command: NumberCommand,
}

impl std::fmt::Debug for PlugwiseNumberEntityDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlugwiseNumberEntityDescription")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("device_class", &self.device_class)
            .field("entity_category", &self.entity_category)
            .field("native_unit_of_measurement", &self.native_unit_of_measurement)
            .finish_non_exhaustive()
    }
}

fn set_max_boiler_temperature(
    api: &dyn SmileApi,
    value: f64,
) -> BoxFuture<'_, Result<(), PlugwiseError>> {
    api.set_max_boiler_temperature(value)
}

pub static NUMBER_TYPES: &[PlugwiseNumberEntityDescription] = &[PlugwiseNumberEntityDescription {
    key: MAX_BOILER_TEMPERATURE,
    name: "Maximum Boiler Temperature Setpoint",
    device_class: Some(NumberDeviceClass::Temperature),
    entity_category: Some(EntityCategory::Config),
    native_unit_of_measurement: Some(TEMP_CELSIUS),
    command: set_max_boiler_temperature,
}];

/// Set up the Plugwise number platform for a config entry
///
/// Reads the coordinator's snapshot once and hands every discovered entity
/// to `async_add_entities` in a single call.
#[instrument(skip_all, fields(entry = %config_entry.entry_id))]
pub async fn async_setup_entry(
    coordinator: Arc<PlugwiseDataUpdateCoordinator>,
    config_entry: &ConfigEntry,
    async_add_entities: AddEntitiesCallback,
) {
    let entities = discover_entities(&coordinator, NUMBER_TYPES);
    info!(
        "Setting up {} Plugwise number entities for {}",
        entities.len(),
        config_entry.title
    );
    async_add_entities(entities);
}

/// One entity per (device, description) where the device reports the description's key
pub fn discover_entities(
    coordinator: &Arc<PlugwiseDataUpdateCoordinator>,
    descriptions: &'static [PlugwiseNumberEntityDescription],
) -> Vec<Arc<dyn NumberEntity>> {
    let Some(data) = coordinator.data() else {
        warn!("No Plugwise data available, no number entities created");
        return Vec::new();
    };

    let mut entities: Vec<Arc<dyn NumberEntity>> = Vec::new();
    for (device_id, device) in &data.devices {
        for description in descriptions {
            if device.contains_key(description.key) {
                debug!(device_id = %device_id, key = description.key, "Found number control");
                entities.push(Arc::new(PlugwiseNumberEntity::new(
                    Arc::clone(coordinator),
                    device_id.clone(),
                    description,
                )));
            }
        }
    }
    entities
}

/// A Plugwise setpoint exposed as a number
pub struct PlugwiseNumberEntity {
    base: PlugwiseEntity,
    description: &'static PlugwiseNumberEntityDescription,
    unique_id: String,
    name: String,
}

impl PlugwiseNumberEntity {
    pub fn new(
        coordinator: Arc<PlugwiseDataUpdateCoordinator>,
        device_id: impl Into<String>,
        description: &'static PlugwiseNumberEntityDescription,
    ) -> Self {
        let base = PlugwiseEntity::new(coordinator, device_id);
        let unique_id = format!("{}-{}", base.device_id(), description.key);
        let name = format!(
            "{} {}",
            base.attribute_str("name").unwrap_or_default(),
            description.name
        )
        .trim_start()
        .to_string();

        Self {
            base,
            description,
            unique_id,
            name,
        }
    }
}

impl Entity for PlugwiseNumberEntity {
    fn unique_id(&self) -> Option<&str> {
        Some(&self.unique_id)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn available(&self) -> bool {
        self.base.available()
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        Some(self.base.device_info())
    }

    fn entity_category(&self) -> Option<EntityCategory> {
        self.description.entity_category
    }
}

#[async_trait]
impl NumberEntity for PlugwiseNumberEntity {
    fn native_min_value(&self) -> f64 {
        self.base
            .attribute_f64("lower_bound")
            .unwrap_or(DEFAULT_MIN_VALUE)
    }

    fn native_max_value(&self) -> f64 {
        self.base
            .attribute_f64("upper_bound")
            .unwrap_or(DEFAULT_MAX_VALUE)
    }

    /// Never below 1, whatever resolution the device reports
    fn native_step(&self) -> f64 {
        self.base
            .attribute_f64("resolution")
            .unwrap_or(DEFAULT_STEP)
            .max(1.0)
    }

    fn native_value(&self) -> Option<f64> {
        self.base.attribute_f64(self.description.key)
    }

    fn native_unit_of_measurement(&self) -> Option<&str> {
        self.description.native_unit_of_measurement
    }

    fn mode(&self) -> NumberMode {
        NumberMode::Box
    }

    fn device_class(&self) -> Option<NumberDeviceClass> {
        self.description.device_class
    }

    /// Send the new value, then refresh whether or not the command succeeded
    #[instrument(skip(self), fields(unique_id = %self.unique_id))]
    async fn async_set_native_value(&self, value: f64) -> Result<(), HomeAssistantError> {
        let coordinator = self.base.coordinator();
        let result = (self.description.command)(coordinator.api().as_ref(), value).await;
        coordinator.async_request_refresh().await;

        result.map_err(|err| {
            warn!("Failed to set {} to {}: {}", self.name, value, err);
            HomeAssistantError::command_failed(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_descriptions_uniquely_keyed() {
        let keys: HashSet<&str> = NUMBER_TYPES.iter().map(|d| d.key).collect();
        assert_eq!(keys.len(), NUMBER_TYPES.len());
    }

    #[test]
    fn test_max_boiler_temperature_description() {
        let description = &NUMBER_TYPES[0];
        assert_eq!(description.key, "maximum_boiler_temperature");
        assert_eq!(description.name, "Maximum Boiler Temperature Setpoint");
        assert_eq!(description.device_class, Some(NumberDeviceClass::Temperature));
        assert_eq!(description.entity_category, Some(EntityCategory::Config));
        assert_eq!(description.native_unit_of_measurement, Some("°C"));
    }
}
