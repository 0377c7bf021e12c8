//! Storage port — repository traits backing the entity registry.

use std::future::Future;

use devicehub_domain::device::Device;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::DeviceHubError;
use devicehub_domain::id::{DeviceId, EntityId};

/// Storage for registered entities.
pub trait EntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send;

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, DeviceHubError>> + Send;

    fn find_by_unique_id(
        &self,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, DeviceHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, DeviceHubError>> + Send;

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send;

    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), DeviceHubError>> + Send;
}

/// Storage for registered devices.
pub trait DeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, DeviceHubError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send;

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, DeviceHubError>> + Send;

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), DeviceHubError>> + Send;
}
