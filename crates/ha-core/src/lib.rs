//! Core types for Home Assistant
//!
//! This crate provides the host-side types that integrations build on:
//! EntityId, State, the Entity and NumberEntity contracts, and the
//! NumberPlatform that receives entities from an integration's setup.

mod entity;
mod entity_id;
mod error;
pub mod number;
mod platform;
mod state;

pub use entity::{DeviceInfo, Entity, EntityCategory};
pub use entity_id::{EntityId, EntityIdError};
pub use error::{BoxError, HomeAssistantError};
pub use number::{NumberDeviceClass, NumberEntity, NumberMode};
pub use platform::{AddEntitiesCallback, NumberPlatform};
pub use state::State;

/// State value for an entity whose value is not known
pub const STATE_UNKNOWN: &str = "unknown";

/// State value for an entity that cannot currently be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// Units of measurement used by built-in integrations
pub mod units {
    /// Degrees Celsius
    pub const TEMP_CELSIUS: &str = "°C";
}
