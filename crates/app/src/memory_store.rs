//! In-memory repositories — the host's entity registry storage.
//!
//! Nothing here outlives the process; entities are re-registered by their
//! integrations on every start.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use devicehub_domain::device::Device;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::DeviceHubError;
use devicehub_domain::id::{DeviceId, EntityId};

use crate::ports::{DeviceRepository, EntityRepository};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`EntityRepository`] backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryEntityRepository {
    store: Mutex<HashMap<EntityId, Entity>>,
}

impl EntityRepository for InMemoryEntityRepository {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send {
        lock(&self.store).insert(entity.id, entity.clone());
        async { Ok(entity) }
    }

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, DeviceHubError>> + Send {
        let result = lock(&self.store).get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_unique_id(
        &self,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, DeviceHubError>> + Send {
        let result = lock(&self.store)
            .values()
            .find(|entity| entity.unique_id == unique_id)
            .cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, DeviceHubError>> + Send {
        let mut result: Vec<Entity> = lock(&self.store).values().cloned().collect();
        result.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        async { Ok(result) }
    }

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send {
        lock(&self.store).insert(entity.id, entity.clone());
        async { Ok(entity) }
    }

    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), DeviceHubError>> + Send {
        lock(&self.store).remove(&id);
        async { Ok(()) }
    }
}

/// [`DeviceRepository`] backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    store: Mutex<HashMap<DeviceId, Device>>,
}

impl DeviceRepository for InMemoryDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, DeviceHubError>> + Send {
        lock(&self.store).insert(device.id, device.clone());
        async { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send {
        let result = lock(&self.store).get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send {
        let result = lock(&self.store)
            .values()
            .find(|device| device.integration == integration && device.unique_id == unique_id)
            .cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, DeviceHubError>> + Send {
        let result: Vec<Device> = lock(&self.store).values().cloned().collect();
        async { Ok(result) }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), DeviceHubError>> + Send {
        lock(&self.store).remove(&id);
        async { Ok(()) }
    }
}
