//! Entity ID type representing a domain.object_id pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id must contain exactly one '.' separator")]
    InvalidFormat,

    #[error("domain cannot be empty")]
    EmptyDomain,

    #[error("object_id cannot be empty")]
    EmptyObjectId,

    #[error("domain contains invalid characters")]
    InvalidDomainChars,

    #[error("object_id contains invalid characters")]
    InvalidObjectIdChars,
}

/// A Home Assistant entity ID such as `number.anna_maximum_boiler_temperature_setpoint`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    domain: String,
    object_id: String,
}

impl EntityId {
    /// Create a new EntityId from domain and object_id parts
    pub fn new(
        domain: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Result<Self, EntityIdError> {
        let domain = domain.into();
        let object_id = object_id.into();

        if domain.is_empty() {
            return Err(EntityIdError::EmptyDomain);
        }
        if object_id.is_empty() {
            return Err(EntityIdError::EmptyObjectId);
        }
        if domain.contains("__") || !is_valid_slug(&domain) {
            return Err(EntityIdError::InvalidDomainChars);
        }
        if !is_valid_slug(&object_id) {
            return Err(EntityIdError::InvalidObjectIdChars);
        }

        Ok(Self { domain, object_id })
    }

    /// Derive an entity ID from a display name, e.g. `"Anna Setpoint"` -> `number.anna_setpoint`
    ///
    /// Names that slugify to nothing fall back to the domain itself as object_id.
    pub fn from_name(domain: &str, name: &str) -> Result<Self, EntityIdError> {
        let object_id = slugify(name);
        if object_id.is_empty() {
            return Self::new(domain, domain);
        }
        Self::new(domain, object_id)
    }

    /// Copy of this ID with `_{suffix}` appended to the object_id
    pub fn with_suffix(&self, suffix: usize) -> Self {
        Self {
            domain: self.domain.clone(),
            object_id: format!("{}_{}", self.object_id, suffix),
        }
    }

    /// Get the domain part of the entity ID
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Get the object_id part of the entity ID
    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

/// Lowercase alphanumeric plus underscores, no leading or trailing underscore
fn is_valid_slug(s: &str) -> bool {
    if s.starts_with('_') || s.ends_with('_') {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn slugify(name: &str) -> String {
    slug::slugify(name).replace('-', "_")
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((domain, object_id)) if !object_id.contains('.') => Self::new(domain, object_id),
            _ => Err(EntityIdError::InvalidFormat),
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.object_id)
    }
}
