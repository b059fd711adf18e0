//! Number entity platform
//!
//! Receives the entities an integration creates during setup, assigns them
//! entity IDs, renders their states and routes `set_value` calls to them.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};

use crate::number::{self, format_number, NumberEntity};
use crate::{EntityId, HomeAssistantError, State, STATE_UNAVAILABLE, STATE_UNKNOWN};

/// Callback handed to an integration's setup; called once with the full batch
pub type AddEntitiesCallback = Box<dyn FnOnce(Vec<Arc<dyn NumberEntity>>) + Send>;

/// Holds the number entities registered by one integration
pub struct NumberPlatform {
    /// Integration that owns these entities (e.g., "plugwise")
    platform: String,
    /// Entities keyed by entity_id string
    entities: DashMap<String, Arc<dyn NumberEntity>>,
    /// unique_id -> entity_id, to reject duplicates
    unique_ids: DashMap<String, EntityId>,
}

impl NumberPlatform {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            entities: DashMap::new(),
            unique_ids: DashMap::new(),
        }
    }

    /// Build the callback an integration uses to register its entities
    pub fn add_entities_callback(self: &Arc<Self>) -> AddEntitiesCallback {
        let platform = Arc::clone(self);
        Box::new(move |entities| {
            platform.add_entities(entities);
        })
    }

    /// Register a batch of entities, returning how many were accepted
    ///
    /// Entities whose unique_id is already registered are skipped.
    #[instrument(skip(self, entities), fields(platform = %self.platform))]
    pub fn add_entities(&self, entities: Vec<Arc<dyn NumberEntity>>) -> usize {
        let mut added = 0;

        for entity in entities {
            if let Some(unique_id) = entity.unique_id() {
                if let Some(existing) = self.unique_ids.get(unique_id) {
                    warn!(
                        "Platform {} does not generate unique IDs. ID {} already exists as {}",
                        self.platform,
                        unique_id,
                        existing.value()
                    );
                    continue;
                }
            }

            let entity_id = match self.generate_entity_id(entity.name()) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Cannot derive entity_id for {:?}: {}", entity.name(), e);
                    continue;
                }
            };

            if let Some(unique_id) = entity.unique_id() {
                self.unique_ids
                    .insert(unique_id.to_string(), entity_id.clone());
            }
            debug!(entity_id = %entity_id, "Adding entity");
            self.entities.insert(entity_id.to_string(), entity);
            added += 1;
        }

        info!("Added {} {} entities", added, self.platform);
        added
    }

    /// `number.<slug(name)>`, suffixed `_2`, `_3`, ... when taken
    fn generate_entity_id(
        &self,
        name: Option<&str>,
    ) -> Result<EntityId, crate::EntityIdError> {
        let base = EntityId::from_name(number::DOMAIN, name.unwrap_or(&self.platform))?;
        if !self.entities.contains_key(&base.to_string()) {
            return Ok(base);
        }

        let mut suffix = 2;
        loop {
            let candidate = base.with_suffix(suffix);
            if !self.entities.contains_key(&candidate.to_string()) {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<Arc<dyn NumberEntity>> {
        self.entities.get(entity_id).map(|e| Arc::clone(e.value()))
    }

    /// Entity ID registered for a unique_id
    pub fn entity_id_for(&self, unique_id: &str) -> Option<EntityId> {
        self.unique_ids.get(unique_id).map(|id| id.value().clone())
    }

    /// All registered entity IDs, sorted
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entities.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Render the current state of one entity
    pub fn state(&self, entity_id: &str) -> Option<State> {
        let entity = self.get(entity_id)?;
        let id: EntityId = entity_id.parse().ok()?;

        let value = if !entity.available() {
            STATE_UNAVAILABLE.to_string()
        } else {
            entity
                .native_value()
                .map(format_number)
                .unwrap_or_else(|| STATE_UNKNOWN.to_string())
        };

        Some(State::new(id, value, number::state_attributes(entity.as_ref())))
    }

    /// Render all states, ordered by entity_id
    pub fn states(&self) -> Vec<State> {
        self.entity_ids()
            .iter()
            .filter_map(|id| self.state(id))
            .collect()
    }

    /// Handle `number.set_value` for one entity
    ///
    /// The value must lie within the entity's current bounds; out-of-range
    /// and NaN values never reach the integration.
    #[instrument(skip(self), fields(platform = %self.platform))]
    pub async fn async_set_value(
        &self,
        entity_id: &str,
        value: f64,
    ) -> Result<(), HomeAssistantError> {
        let entity = self
            .get(entity_id)
            .ok_or_else(|| HomeAssistantError::EntityNotFound(entity_id.to_string()))?;

        if !entity.available() {
            return Err(HomeAssistantError::Unavailable(entity_id.to_string()));
        }

        let min = entity.native_min_value();
        let max = entity.native_max_value();
        if !(min..=max).contains(&value) {
            return Err(HomeAssistantError::ValueOutOfRange {
                entity_id: entity_id.to_string(),
                value,
                min,
                max,
            });
        }

        debug!("Setting {} to {}", entity_id, value);
        entity.async_set_native_value(value).await
    }
}
