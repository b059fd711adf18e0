//! Number entity contract
//!
//! A number entity exposes a settable numeric value with bounds and a step.
//! Integrations report values in their native unit; the platform renders
//! them into a [`State`](crate::State) with `min`/`max`/`step`/`mode`
//! attributes.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Entity, HomeAssistantError};

/// Entity domain for numbers
pub const DOMAIN: &str = "number";

pub const DEFAULT_MIN_VALUE: f64 = 0.0;
pub const DEFAULT_MAX_VALUE: f64 = 100.0;
pub const DEFAULT_STEP: f64 = 1.0;

/// How the frontend should render the control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberMode {
    #[default]
    Auto,
    Box,
    Slider,
}

impl NumberMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberMode::Auto => "auto",
            NumberMode::Box => "box",
            NumberMode::Slider => "slider",
        }
    }
}

/// Device class of a number entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberDeviceClass {
    Temperature,
    Humidity,
    Power,
    Pressure,
    Voltage,
}

impl NumberDeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberDeviceClass::Temperature => "temperature",
            NumberDeviceClass::Humidity => "humidity",
            NumberDeviceClass::Power => "power",
            NumberDeviceClass::Pressure => "pressure",
            NumberDeviceClass::Voltage => "voltage",
        }
    }
}

/// Read/write contract of a number entity
///
/// Reads are synchronous and should reflect the integration's latest data;
/// the write is async and may reach out to a remote device.
#[async_trait]
pub trait NumberEntity: Entity {
    fn native_min_value(&self) -> f64 {
        DEFAULT_MIN_VALUE
    }

    fn native_max_value(&self) -> f64 {
        DEFAULT_MAX_VALUE
    }

    fn native_step(&self) -> f64 {
        DEFAULT_STEP
    }

    /// Current value, `None` when unknown
    fn native_value(&self) -> Option<f64>;

    fn native_unit_of_measurement(&self) -> Option<&str> {
        None
    }

    fn mode(&self) -> NumberMode {
        NumberMode::Auto
    }

    fn device_class(&self) -> Option<NumberDeviceClass> {
        None
    }

    /// Change the value. Errors from the integration are returned unchanged.
    async fn async_set_native_value(&self, value: f64) -> Result<(), HomeAssistantError>;
}

/// Format a number for state display (drop a zero fraction)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Attributes rendered alongside a number entity's state
pub fn state_attributes(entity: &dyn NumberEntity) -> HashMap<String, serde_json::Value> {
    let mut attributes = HashMap::new();
    attributes.insert("min".to_string(), json!(entity.native_min_value()));
    attributes.insert("max".to_string(), json!(entity.native_max_value()));
    attributes.insert("step".to_string(), json!(entity.native_step()));
    attributes.insert("mode".to_string(), json!(entity.mode().as_str()));

    if let Some(unit) = entity.native_unit_of_measurement() {
        attributes.insert("unit_of_measurement".to_string(), json!(unit));
    }
    if let Some(device_class) = entity.device_class() {
        attributes.insert("device_class".to_string(), json!(device_class.as_str()));
    }
    if let Some(name) = entity.name() {
        attributes.insert("friendly_name".to_string(), json!(name));
    }
    attributes
}
