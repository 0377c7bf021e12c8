//! Device service — use-cases for managing devices.

use devicehub_domain::device::Device;
use devicehub_domain::error::{ConflictError, DeviceHubError, NotFoundError};
use devicehub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for device registration.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a new device after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::Validation`] if invariants fail,
    /// [`DeviceHubError::Conflict`] if the `(integration, unique_id)` pair is
    /// taken, or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn register_device(&self, device: Device) -> Result<Device, DeviceHubError> {
        device.validate()?;
        if self
            .repo
            .find_by_integration_unique_id(&device.integration, &device.unique_id)
            .await?
            .is_some()
        {
            return Err(ConflictError {
                entity: "Device",
                unique_id: device.unique_id,
            }
            .into());
        }
        self.repo.create(device).await
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, DeviceHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, DeviceHubError> {
        self.repo.get_all().await
    }

    /// Delete a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] if the device does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), DeviceHubError> {
        self.get_device(id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicehub_domain::error::ValidationError;

    use crate::memory_store::InMemoryDeviceRepository;

    fn device(unique_id: &str) -> Device {
        Device::builder()
            .name("Bathroom")
            .manufacturer("Warmup")
            .integration("warmup")
            .unique_id(unique_id)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_register_and_get_device() {
        let svc = DeviceService::new(InMemoryDeviceRepository::default());
        let created = svc.register_device(device("warmup_home_bath")).await.unwrap();

        let found = svc.get_device(created.id).await.unwrap();
        assert_eq!(found.name, "Bathroom");
    }

    #[tokio::test]
    async fn should_reject_second_device_with_same_unique_id() {
        let svc = DeviceService::new(InMemoryDeviceRepository::default());
        svc.register_device(device("warmup_home_bath")).await.unwrap();

        let result = svc.register_device(device("warmup_home_bath")).await;
        assert!(matches!(result, Err(DeviceHubError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_reject_device_with_empty_name() {
        let svc = DeviceService::new(InMemoryDeviceRepository::default());
        let mut invalid = device("x");
        invalid.name = String::new();

        let result = svc.register_device(invalid).await;
        assert!(matches!(
            result,
            Err(DeviceHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_deleting_missing_device() {
        let svc = DeviceService::new(InMemoryDeviceRepository::default());
        let result = svc.delete_device(DeviceId::for_device("blustream", "missing")).await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_device() {
        let svc = DeviceService::new(InMemoryDeviceRepository::default());
        let created = svc.register_device(device("warmup_home_bath")).await.unwrap();

        svc.delete_device(created.id).await.unwrap();
        assert!(svc.list_devices().await.unwrap().is_empty());
    }
}
