//! Media-player entity adapter for one matrix.

use std::sync::{Mutex, MutexGuard, PoisonError};

use devicehub_app::availability::AvailabilityTracker;
use devicehub_app::device_lock::LockedHandle;
use devicehub_app::executor::BlockingExecutor;
use devicehub_domain::device::Device;
use devicehub_domain::entity::{DeviceClass, Entity, EntityState, SupportedFeatures, slugify};
use devicehub_domain::error::{DeviceError, DeviceHubError, ValidationError};
use devicehub_domain::id::{DeviceId, EntityId};

use crate::handle::MatrixHandle;

/// Manufacturer reported in device info.
pub const MANUFACTURER: &str = "Blustream";

/// Features every matrix supports.
pub const SUPPORTED_FEATURES: SupportedFeatures = SupportedFeatures::TURN_ON
    .union(SupportedFeatures::TURN_OFF)
    .union(SupportedFeatures::SELECT_SOURCE);

/// Raw fields read from the handle in one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixReading {
    pub is_on: bool,
    pub source: Option<String>,
    pub source_list: Vec<String>,
}

#[derive(Debug)]
struct Snapshot {
    reading: Option<MatrixReading>,
    availability: AvailabilityTracker,
}

impl Snapshot {
    fn state(&self) -> EntityState {
        if !self.availability.is_available() {
            return EntityState::Unavailable;
        }
        match &self.reading {
            None => EntityState::Unknown,
            Some(reading) if reading.is_on => EntityState::On,
            Some(_) => EntityState::Off,
        }
    }
}

/// Entity adapter wrapping an exclusively owned [`MatrixHandle`].
///
/// Accessors read the last successful poll. Commands go to the device and
/// never touch the snapshot; the next poll observes their effect.
pub struct MatrixDevice<H> {
    entity_id: EntityId,
    device_id: DeviceId,
    name: String,
    unique_id: String,
    handle: LockedHandle<H>,
    snapshot: Mutex<Snapshot>,
}

impl<H: MatrixHandle> MatrixDevice<H> {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        unique_id: impl Into<String>,
        handle: H,
        executor: BlockingExecutor,
        failure_threshold: u32,
    ) -> Self {
        let unique_id: String = unique_id.into();
        Self {
            entity_id: EntityId::from_unique_id(&unique_id),
            device_id: DeviceId::for_device(crate::DOMAIN, &unique_id),
            name: name.into(),
            unique_id,
            handle: LockedHandle::new(handle, executor),
            snapshot: Mutex::new(Snapshot {
                reading: None,
                availability: AvailabilityTracker::new(failure_threshold),
            }),
        }
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::Tv
    }

    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        SUPPORTED_FEATURES
    }

    #[must_use]
    pub fn should_poll(&self) -> bool {
        true
    }

    /// Host-facing state: `unknown` before the first poll, `unavailable`
    /// after too many failed polls.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.lock_snapshot().state()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lock_snapshot().availability.is_available()
    }

    #[must_use]
    pub fn source(&self) -> Option<String> {
        self.lock_snapshot()
            .reading
            .as_ref()
            .and_then(|reading| reading.source.clone())
    }

    #[must_use]
    pub fn source_list(&self) -> Vec<String> {
        self.lock_snapshot()
            .reading
            .as_ref()
            .map(|reading| reading.source_list.clone())
            .unwrap_or_default()
    }

    /// Refresh the snapshot from the device. Returns `false` on failure,
    /// leaving the previous snapshot untouched.
    pub async fn poll(&self) -> bool {
        let result = self
            .handle
            .call("update", |matrix| {
                if !matrix.update()? {
                    return Err(DeviceError::FetchFailed);
                }
                Ok(MatrixReading {
                    is_on: matrix.is_on(),
                    source: matrix.source(),
                    source_list: matrix.sources(),
                })
            })
            .await;

        let mut snapshot = self.lock_snapshot();
        match result {
            Ok(reading) => {
                if snapshot.availability.record_success() {
                    tracing::info!(unique_id = %self.unique_id, "matrix available again");
                }
                snapshot.reading = Some(reading);
                true
            }
            Err(err) => {
                tracing::warn!(unique_id = %self.unique_id, error = %err, "matrix poll failed");
                if snapshot.availability.record_failure() {
                    tracing::warn!(
                        unique_id = %self.unique_id,
                        failures = snapshot.availability.consecutive_failures(),
                        "matrix marked unavailable"
                    );
                }
                false
            }
        }
    }

    async fn command<F>(&self, service: &'static str, f: F) -> Result<(), DeviceHubError>
    where
        F: FnOnce(&mut H) -> Result<(), DeviceError> + Send + 'static,
    {
        self.handle.call(service, f).await.map_err(|source| {
            tracing::warn!(unique_id = %self.unique_id, service, error = %source, "matrix command failed");
            DeviceHubError::Command { service, source }
        })
    }

    /// # Errors
    ///
    /// Returns [`DeviceHubError::Command`] when the device call fails.
    pub async fn turn_on(&self) -> Result<(), DeviceHubError> {
        self.command("turn_on", H::turn_on).await
    }

    /// # Errors
    ///
    /// Returns [`DeviceHubError::Command`] when the device call fails.
    pub async fn turn_off(&self) -> Result<(), DeviceHubError> {
        self.command("turn_off", H::turn_off).await
    }

    /// Route `source` to the outputs.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::Command`] when `source` is not in the last
    /// polled source list, or when the device call fails.
    pub async fn select_source(&self, source: &str) -> Result<(), DeviceHubError> {
        let known = self.source_list();
        if !known.is_empty() && !known.iter().any(|name| name == source) {
            tracing::warn!(unique_id = %self.unique_id, source, "unknown matrix source");
            return Err(DeviceHubError::Command {
                service: "select_source",
                source: DeviceError::Rejected(format!("unknown source `{source}`")),
            });
        }
        let name = source.to_string();
        self.command("select_source", move |matrix| matrix.select_source(&name))
            .await
    }

    /// Release the device handle and drop the cached snapshot.
    pub async fn release(&self) {
        if self.handle.release().await {
            tracing::debug!(unique_id = %self.unique_id, "matrix handle released");
        }
        self.lock_snapshot().reading = None;
    }

    /// Device info registered alongside the entity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or unique id is empty.
    pub fn device_info(&self, model: Option<&str>) -> Result<Device, ValidationError> {
        let mut builder = Device::builder()
            .id(self.device_id)
            .name(&self.name)
            .manufacturer(MANUFACTURER)
            .integration(crate::DOMAIN)
            .unique_id(&self.unique_id);
        if let Some(model) = model {
            builder = builder.model(model);
        }
        builder.build()
    }

    /// Render the adapter as a host entity, every field from the same poll.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or unique id is empty.
    pub fn to_entity(&self) -> Result<Entity, ValidationError> {
        let snapshot = self.lock_snapshot();
        let source_list = snapshot
            .reading
            .as_ref()
            .map(|reading| reading.source_list.clone())
            .unwrap_or_default();
        let mut builder = Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(format!("media_player.{}", slugify(&self.unique_id)))
            .unique_id(&self.unique_id)
            .friendly_name(&self.name)
            .device_class(self.device_class())
            .state(snapshot.state())
            .supported_features(self.supported_features())
            .attribute("source_list", source_list);
        if let Some(source) = snapshot.reading.as_ref().and_then(|r| r.source.clone()) {
            builder = builder.attribute("source", source);
        }
        builder.build()
    }
}
