//! Entity — the central state-holding concept in devicehub.
//!
//! An entity represents a single observable/controllable aspect of a device
//! (a matrix's power and input selection, a thermostat's heating mode).

mod attribute_value;
mod features;
mod state;

pub use attribute_value::AttributeValue;
pub use features::SupportedFeatures;
pub use state::EntityState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// Host classification of an entity, used for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Tv,
    Thermostat,
}

/// Host-visible snapshot of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    /// `<domain>.<object_id>`, e.g. `climate.warmup_home_kitchen`.
    pub entity_id: String,
    /// Stable identifier chosen by the integration.
    pub unique_id: String,
    pub friendly_name: String,
    pub device_class: Option<DeviceClass>,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub supported_features: SupportedFeatures,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId);
        }
        match self.entity_id.split_once('.') {
            Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => {}
            _ => return Err(ValidationError::MalformedEntityId(self.entity_id.clone())),
        }
        if self.unique_id.trim().is_empty() {
            return Err(ValidationError::EmptyUniqueId);
        }
        if self.friendly_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Record a new state, bumping `last_changed` only when it differs.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
        self.last_updated = at;
    }

    /// Whether `other` carries the same observable state and attributes.
    #[must_use]
    pub fn same_observation(&self, other: &Self) -> bool {
        self.state == other.state && self.attributes == other.attributes
    }
}

/// Builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: String,
    unique_id: String,
    friendly_name: String,
    device_class: Option<DeviceClass>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
    supported_features: SupportedFeatures,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = entity_id.into();
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = name.into();
        self
    }

    #[must_use]
    pub fn device_class(mut self, device_class: DeviceClass) -> Self {
        self.device_class = Some(device_class);
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn supported_features(mut self, features: SupportedFeatures) -> Self {
        self.supported_features = features;
        self
    }

    /// Build and validate the entity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if an invariant fails.
    pub fn build(self) -> Result<Entity, ValidationError> {
        let ts = now();
        let entity = Entity {
            id: self
                .id
                .unwrap_or_else(|| EntityId::from_unique_id(&self.unique_id)),
            device_id: self.device_id.unwrap_or_default(),
            entity_id: self.entity_id,
            unique_id: self.unique_id,
            friendly_name: self.friendly_name,
            device_class: self.device_class,
            state: self.state,
            attributes: self.attributes,
            supported_features: self.supported_features,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

/// Turn a free-form identifier into an entity object id
/// (`"Kitchen Floor"` → `"kitchen_floor"`).
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_builder() -> EntityBuilder {
        Entity::builder()
            .entity_id("climate.kitchen")
            .unique_id("warmup_home_kitchen")
            .friendly_name("Kitchen")
    }

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = valid_builder()
            .state(EntityState::Heat)
            .attribute("temperature", 21.5)
            .build()
            .unwrap();
        assert_eq!(entity.state, EntityState::Heat);
        assert_eq!(
            entity.get_attribute("temperature"),
            Some(&AttributeValue::Float(21.5))
        );
    }

    #[test]
    fn should_reject_entity_id_without_domain() {
        let result = valid_builder().entity_id("kitchen").build();
        assert!(matches!(
            result,
            Err(ValidationError::MalformedEntityId(_))
        ));
    }

    #[test]
    fn should_reject_empty_entity_id() {
        let result = valid_builder().entity_id("").build();
        assert_eq!(result.unwrap_err(), ValidationError::EmptyEntityId);
    }

    #[test]
    fn should_reject_empty_unique_id() {
        let result = valid_builder().unique_id(" ").build();
        assert_eq!(result.unwrap_err(), ValidationError::EmptyUniqueId);
    }

    #[test]
    fn should_bump_last_changed_only_when_state_differs() {
        let mut entity = valid_builder().state(EntityState::Off).build().unwrap();
        let first_change = entity.last_changed;

        let later = first_change + chrono::Duration::seconds(5);
        entity.update_state(EntityState::Off, later);
        assert_eq!(entity.last_changed, first_change);
        assert_eq!(entity.last_updated, later);

        let even_later = later + chrono::Duration::seconds(5);
        entity.update_state(EntityState::Heat, even_later);
        assert_eq!(entity.last_changed, even_later);
    }

    #[test]
    fn should_slugify_free_form_text() {
        assert_eq!(slugify("Kitchen Floor"), "kitchen_floor");
        assert_eq!(slugify("10.0.0.5:23"), "10_0_0_5_23");
        assert_eq!(slugify("--Hall--"), "hall");
    }
}
