//! Concrete [`IntegrationContext`] backed by application services.

use std::sync::Arc;

use devicehub_domain::device::Device;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::DeviceHubError;
use devicehub_domain::event::Event;
use devicehub_domain::id::EntityId;

use crate::ports::{DeviceRepository, EntityRepository, EventPublisher, IntegrationContext};
use crate::services::device_service::DeviceService;
use crate::services::entity_service::EntityService;

/// [`IntegrationContext`] implementation that delegates to `DeviceService`,
/// `EntityService`, and an `EventPublisher`.
///
/// Wraps `Arc`-ed services so it is cheaply cloneable and `Send + Sync`.
/// The generic parameters are confined to this struct; integrations see
/// only the [`IntegrationContext`] trait.
pub struct ServiceContext<DR, ER, EP> {
    device_service: Arc<DeviceService<DR>>,
    entity_service: Arc<EntityService<ER, EP>>,
    event_publisher: EP,
}

impl<DR, ER, EP> ServiceContext<DR, ER, EP> {
    /// Create a new context backed by the given services and event publisher.
    pub fn new(
        device_service: Arc<DeviceService<DR>>,
        entity_service: Arc<EntityService<ER, EP>>,
        event_publisher: EP,
    ) -> Self {
        Self {
            device_service,
            entity_service,
            event_publisher,
        }
    }
}

impl<DR, ER, EP: Clone> Clone for ServiceContext<DR, ER, EP> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            entity_service: Arc::clone(&self.entity_service),
            event_publisher: self.event_publisher.clone(),
        }
    }
}

impl<DR, ER, EP> IntegrationContext for ServiceContext<DR, ER, EP>
where
    DR: DeviceRepository + Send + Sync + 'static,
    ER: EntityRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    async fn register(&self, device: Device, mut entity: Entity) -> Result<Entity, DeviceHubError> {
        let device = self.device_service.register_device(device).await?;
        entity.device_id = device.id;
        match self.entity_service.register_entity(entity).await {
            Ok(entity) => Ok(entity),
            Err(err) => {
                // the entity never became visible, so its device must not either
                self.device_service.delete_device(device.id).await?;
                Err(err)
            }
        }
    }

    async fn update_entity(&self, entity: Entity) -> Result<Entity, DeviceHubError> {
        self.entity_service.update_entity(entity).await
    }

    async fn unregister(&self, entity_id: EntityId) -> Result<(), DeviceHubError> {
        let entity = self.entity_service.remove_entity(entity_id).await?;
        match self.device_service.delete_device(entity.device_id).await {
            Ok(()) | Err(DeviceHubError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn publish(&self, event: Event) -> Result<(), DeviceHubError> {
        self.event_publisher.publish(event).await
    }
}
