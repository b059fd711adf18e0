//! Base for all Plugwise entities

use std::sync::Arc;

use ha_core::DeviceInfo;
use serde_json::Value;

use crate::consts::{DOMAIN, MANUFACTURER};
use crate::coordinator::PlugwiseDataUpdateCoordinator;

/// Binds one device of the coordinator's snapshot to an entity
///
/// Holds no device data itself; every accessor reads the coordinator's
/// current snapshot.
pub struct PlugwiseEntity {
    coordinator: Arc<PlugwiseDataUpdateCoordinator>,
    device_id: String,
}

impl PlugwiseEntity {
    pub fn new(coordinator: Arc<PlugwiseDataUpdateCoordinator>, device_id: impl Into<String>) -> Self {
        Self {
            coordinator,
            device_id: device_id.into(),
        }
    }

    pub fn coordinator(&self) -> &Arc<PlugwiseDataUpdateCoordinator> {
        &self.coordinator
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Attribute of this device in the current snapshot
    pub fn attribute(&self, key: &str) -> Option<Value> {
        let data = self.coordinator.data()?;
        data.devices.get(&self.device_id)?.get(key).cloned()
    }

    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attribute(key).and_then(|v| v.as_f64())
    }

    pub fn attribute_str(&self, key: &str) -> Option<String> {
        match self.attribute(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Last refresh succeeded, the device is still reported and not flagged unavailable
    pub fn available(&self) -> bool {
        if !self.coordinator.last_update_success() {
            return false;
        }
        let Some(data) = self.coordinator.data() else {
            return false;
        };
        match data.devices.get(&self.device_id) {
            Some(device) => device.get("available").and_then(Value::as_bool) != Some(false),
            None => false,
        }
    }

    pub fn device_info(&self) -> DeviceInfo {
        let gateway_id = self
            .coordinator
            .data()
            .map(|data| data.gateway.gateway_id.clone());

        DeviceInfo {
            identifiers: vec![(DOMAIN.to_string(), self.device_id.clone())],
            name: self.attribute_str("name"),
            manufacturer: Some(
                self.attribute_str("vendor")
                    .unwrap_or_else(|| MANUFACTURER.to_string()),
            ),
            model: self.attribute_str("model"),
            sw_version: self.attribute_str("firmware"),
            via_device: gateway_id
                .filter(|gateway_id| *gateway_id != self.device_id)
                .map(|gateway_id| (DOMAIN.to_string(), gateway_id)),
        }
    }
}
