//! Entity service — the host's entity registry use-cases.

use devicehub_domain::entity::Entity;
use devicehub_domain::error::{ConflictError, DeviceHubError, NotFoundError};
use devicehub_domain::event::{Event, EventType};
use devicehub_domain::id::EntityId;
use devicehub_domain::time::now;

use crate::ports::{EntityRepository, EventPublisher};

/// Application service for entity registration and state tracking.
pub struct EntityService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: EntityRepository, P: EventPublisher> EntityService<R, P> {
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Register a new entity, keyed by its unique id.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::Validation`] if invariants fail,
    /// [`DeviceHubError::Conflict`] if the unique id is already registered,
    /// or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    pub async fn register_entity(&self, mut entity: Entity) -> Result<Entity, DeviceHubError> {
        entity.validate()?;
        if self
            .repo
            .find_by_unique_id(&entity.unique_id)
            .await?
            .is_some()
        {
            return Err(ConflictError {
                entity: "Entity",
                unique_id: entity.unique_id,
            }
            .into());
        }
        let ts = now();
        entity.last_changed = ts;
        entity.last_updated = ts;
        let created = self.repo.create(entity).await?;

        self.publisher
            .publish(Event::new(
                EventType::EntityRegistered,
                Some(created.id),
                serde_json::json!({
                    "entity_id": created.entity_id,
                    "unique_id": created.unique_id,
                }),
            ))
            .await?;
        tracing::info!(unique_id = %created.unique_id, "entity registered");
        Ok(created)
    }

    /// Look up an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] when no entity with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, DeviceHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all registered entities.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, DeviceHubError> {
        self.repo.get_all().await
    }

    /// Replace the stored snapshot of a registered entity.
    ///
    /// Publishes `StateChanged` when state or attributes differ from what
    /// was stored; `last_changed` only moves when the state itself changes.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] if the entity is not registered,
    /// or a storage error from the repository.
    pub async fn update_entity(&self, snapshot: Entity) -> Result<Entity, DeviceHubError> {
        let mut stored = self.get_entity(snapshot.id).await?;
        if stored.same_observation(&snapshot) {
            stored.last_updated = now();
            return self.repo.update(stored).await;
        }

        let from = stored.state;
        stored.attributes = snapshot.attributes;
        stored.friendly_name = snapshot.friendly_name;
        stored.supported_features = snapshot.supported_features;
        stored.update_state(snapshot.state, now());
        let updated = self.repo.update(stored).await?;

        self.publisher
            .publish(Event::new(
                EventType::StateChanged,
                Some(updated.id),
                serde_json::json!({
                    "entity_id": updated.entity_id,
                    "from": from.to_string(),
                    "to": updated.state.to_string(),
                }),
            ))
            .await?;
        Ok(updated)
    }

    /// Remove an entity from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] if the entity is not registered,
    /// or a storage error from the repository.
    pub async fn remove_entity(&self, id: EntityId) -> Result<Entity, DeviceHubError> {
        let entity = self.get_entity(id).await?;
        self.repo.delete(id).await?;
        self.publisher
            .publish(Event::new(
                EventType::EntityRemoved,
                Some(id),
                serde_json::json!({"entity_id": entity.entity_id}),
            ))
            .await?;
        tracing::info!(unique_id = %entity.unique_id, "entity removed");
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicehub_domain::entity::EntityState;
    use devicehub_domain::error::ValidationError;

    use crate::event_bus::InProcessEventBus;
    use crate::memory_store::InMemoryEntityRepository;

    fn make_service() -> (
        EntityService<InMemoryEntityRepository, std::sync::Arc<InProcessEventBus>>,
        std::sync::Arc<InProcessEventBus>,
    ) {
        let bus = std::sync::Arc::new(InProcessEventBus::new(16));
        (
            EntityService::new(InMemoryEntityRepository::default(), bus.clone()),
            bus,
        )
    }

    fn valid_entity(unique_id: &str) -> Entity {
        Entity::builder()
            .entity_id(format!("media_player.{unique_id}"))
            .unique_id(unique_id)
            .friendly_name("Matrix")
            .state(EntityState::Off)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_register_entity_and_publish_event() {
        let (svc, bus) = make_service();
        let mut rx = bus.subscribe();

        let created = svc.register_entity(valid_entity("m1")).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::EntityRegistered);
        assert_eq!(event.entity_id, Some(created.id));
    }

    #[tokio::test]
    async fn should_reject_duplicate_unique_id() {
        let (svc, _bus) = make_service();
        svc.register_entity(valid_entity("m1")).await.unwrap();

        let result = svc.register_entity(valid_entity("m1")).await;
        assert!(matches!(result, Err(DeviceHubError::Conflict(_))));
        assert_eq!(svc.list_entities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_invalid_entity() {
        let (svc, _bus) = make_service();
        let mut entity = valid_entity("m1");
        entity.entity_id = String::new();

        let result = svc.register_entity(entity).await;
        assert!(matches!(
            result,
            Err(DeviceHubError::Validation(ValidationError::EmptyEntityId))
        ));
    }

    #[tokio::test]
    async fn should_publish_state_changed_only_when_observation_differs() {
        let (svc, bus) = make_service();
        let created = svc.register_entity(valid_entity("m1")).await.unwrap();
        let mut rx = bus.subscribe();

        svc.update_entity(created.clone()).await.unwrap();
        assert!(rx.try_recv().is_err());

        let mut changed = created.clone();
        changed.state = EntityState::On;
        let updated = svc.update_entity(changed).await.unwrap();
        assert_eq!(updated.state, EntityState::On);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::StateChanged);
        assert_eq!(event.data["from"], "off");
        assert_eq!(event.data["to"], "on");
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_unregistered_entity() {
        let (svc, _bus) = make_service();
        let result = svc.update_entity(valid_entity("ghost")).await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_remove_entity() {
        let (svc, _bus) = make_service();
        let created = svc.register_entity(valid_entity("m1")).await.unwrap();

        svc.remove_entity(created.id).await.unwrap();

        let result = svc.get_entity(created.id).await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }
}
