//! Base entity contract shared by all entity platforms

use serde::{Deserialize, Serialize};

/// Category an entity is shown under, separate from primary controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    /// Changes how the device behaves (setpoints, limits)
    Config,
    /// Read-only information about the device
    Diagnostic,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Config => "config",
            EntityCategory::Diagnostic => "diagnostic",
        }
    }
}

/// Device information an entity attaches itself to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// (domain, identifier) pairs that uniquely identify the device
    pub identifiers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    /// Identifier of the hub this device is reached through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_device: Option<(String, String)>,
}

/// Contract every entity exposes to its platform
pub trait Entity: Send + Sync {
    /// Stable identifier used to detect duplicates across setups
    fn unique_id(&self) -> Option<&str> {
        None
    }

    /// Display name, also the source of the generated entity_id
    fn name(&self) -> Option<&str> {
        None
    }

    fn available(&self) -> bool {
        true
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        None
    }

    fn entity_category(&self) -> Option<EntityCategory> {
        None
    }
}
