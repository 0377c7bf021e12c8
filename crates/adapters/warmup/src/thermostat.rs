//! Climate entity adapter for one thermostat room.

use std::sync::{Mutex, MutexGuard, PoisonError};

use devicehub_app::availability::AvailabilityTracker;
use devicehub_app::device_lock::LockedHandle;
use devicehub_app::executor::BlockingExecutor;
use devicehub_domain::climate::{CELSIUS, HvacMode, PresetMode};
use devicehub_domain::device::Device;
use devicehub_domain::entity::{DeviceClass, Entity, EntityState, SupportedFeatures, slugify};
use devicehub_domain::error::{DeviceError, DeviceHubError, ValidationError};
use devicehub_domain::id::{DeviceId, EntityId};

use crate::handle::ThermostatHandle;
use crate::mode::OperationMode;

pub const MANUFACTURER: &str = "Warmup";

pub const SUPPORTED_FEATURES: SupportedFeatures = SupportedFeatures::TARGET_TEMPERATURE
    .union(SupportedFeatures::PRESET_MODE)
    .union(SupportedFeatures::TURN_ON)
    .union(SupportedFeatures::TURN_OFF);

/// Raw fields read from the handle in one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatReading {
    pub run_mode: String,
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

#[derive(Debug)]
struct Snapshot {
    mode: OperationMode,
    reading: Option<ThermostatReading>,
    availability: AvailabilityTracker,
}

impl Snapshot {
    fn state(&self) -> EntityState {
        if !self.availability.is_available() {
            return EntityState::Unavailable;
        }
        match self.mode.hvac_mode() {
            HvacMode::Off => EntityState::Off,
            HvacMode::Heat => EntityState::Heat,
            HvacMode::Auto => EntityState::Auto,
        }
    }
}

/// Entity adapter wrapping an exclusively owned [`ThermostatHandle`].
///
/// Every accessor reads the last successful poll; until then the room is
/// assumed to follow its program. Commands never touch the snapshot.
pub struct WarmupThermostat<H> {
    entity_id: EntityId,
    device_id: DeviceId,
    name: String,
    unique_id: String,
    handle: LockedHandle<H>,
    snapshot: Mutex<Snapshot>,
}

impl<H: ThermostatHandle> WarmupThermostat<H> {
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
                mode: OperationMode::default(),
                reading: None,
                availability: AvailabilityTracker::new(failure_threshold),
            }),
        }
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reading<T>(&self, f: impl FnOnce(&ThermostatReading) -> T) -> Option<T> {
        self.lock_snapshot().reading.as_ref().map(f)
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
        DeviceClass::Thermostat
    }

    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        SUPPORTED_FEATURES
    }

    #[must_use]
    pub fn should_poll(&self) -> bool {
        true
    }

    #[must_use]
    pub fn temperature_unit(&self) -> &'static str {
        CELSIUS
    }

    #[must_use]
    pub fn operation_mode(&self) -> OperationMode {
        self.lock_snapshot().mode
    }

    #[must_use]
    pub fn hvac_mode(&self) -> HvacMode {
        self.operation_mode().hvac_mode()
    }

    #[must_use]
    pub fn hvac_modes(&self) -> &'static [HvacMode] {
        &HvacMode::ALL
    }

    #[must_use]
    pub fn preset_mode(&self) -> PresetMode {
        self.operation_mode().preset_mode()
    }

    #[must_use]
    pub fn preset_modes(&self) -> &'static [PresetMode] {
        &PresetMode::ALL
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.operation_mode().is_on()
    }

    #[must_use]
    pub fn is_away(&self) -> bool {
        self.operation_mode().is_away()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lock_snapshot().availability.is_available()
    }

    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.reading(|r| r.current_temperature)
    }

    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.reading(|r| r.target_temperature)
    }

    #[must_use]
    pub fn min_temp(&self) -> Option<f64> {
        self.reading(|r| r.min_temp)
    }

    #[must_use]
    pub fn max_temp(&self) -> Option<f64> {
        self.reading(|r| r.max_temp)
    }

    /// Host-facing state derived from the HVAC mode.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.lock_snapshot().state()
    }

    /// Refresh the snapshot from the vendor cloud. Returns `false` on
    /// failure, leaving every property as it was.
    pub async fn poll(&self) -> bool {
        let result = self
            .handle
            .call("update", |session| {
                if !session.update()? {
                    return Err(DeviceError::FetchFailed);
                }
                let (min_temp, max_temp) = session.target_temperature_bounds();
                Ok(ThermostatReading {
                    run_mode: session.run_mode(),
                    current_temperature: session.current_temperature(),
                    target_temperature: session.target_temperature(),
                    min_temp,
                    max_temp,
                })
            })
            .await;

        let mut snapshot = self.lock_snapshot();
        match result {
            Ok(reading) => {
                if snapshot.availability.record_success() {
                    tracing::info!(unique_id = %self.unique_id, "thermostat available again");
                }
                let mode = OperationMode::from_run_mode(&reading.run_mode);
                if mode != snapshot.mode {
                    tracing::debug!(
                        unique_id = %self.unique_id,
                        from = %snapshot.mode,
                        to = %mode,
                        run_mode = %reading.run_mode,
                        "thermostat mode changed"
                    );
                }
                snapshot.mode = mode;
                snapshot.reading = Some(reading);
                true
            }
            Err(err) => {
                tracing::warn!(unique_id = %self.unique_id, error = %err, "updating thermostat failed");
                if snapshot.availability.record_failure() {
                    tracing::warn!(
                        unique_id = %self.unique_id,
                        failures = snapshot.availability.consecutive_failures(),
                        "thermostat marked unavailable"
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
            tracing::warn!(unique_id = %self.unique_id, service, error = %source, "thermostat command failed");
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

    /// Set a new manual target.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::Validation`] for a non-finite value, without
    /// touching the device, and [`DeviceHubError::Command`] when the device
    /// call fails.
    pub async fn set_temperature(&self, temperature: f64) -> Result<(), DeviceHubError> {
        if !temperature.is_finite() {
            return Err(ValidationError::InvalidField {
                field: "temperature",
                reason: format!("expected a finite number, got {temperature}"),
            }
            .into());
        }
        self.command("set_temperature", move |session| {
            session.set_new_temperature(temperature)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`DeviceHubError::Command`] when the device call fails.
    pub async fn set_hvac_mode(&self, hvac_mode: HvacMode) -> Result<(), DeviceHubError> {
        match hvac_mode {
            HvacMode::Off => self.command("set_hvac_mode", H::set_location_to_off).await,
            HvacMode::Heat => {
                self.command("set_hvac_mode", H::set_temperature_to_manual)
                    .await
            }
            HvacMode::Auto => self.command("set_hvac_mode", H::set_temperature_to_auto).await,
        }
    }

    /// # Errors
    ///
    /// Returns [`DeviceHubError::Command`] when the device call fails.
    pub async fn set_preset_mode(&self, preset_mode: PresetMode) -> Result<(), DeviceHubError> {
        match preset_mode {
            PresetMode::Away => {
                self.command("set_preset_mode", H::set_location_to_frost)
                    .await
            }
            PresetMode::None => {
                self.command("set_preset_mode", H::set_temperature_to_manual)
                    .await
            }
        }
    }

    /// Release the session and drop the cached snapshot.
    pub async fn release(&self) {
        if self.handle.release().await {
            tracing::debug!(unique_id = %self.unique_id, "thermostat session released");
        }
        let mut snapshot = self.lock_snapshot();
        snapshot.reading = None;
        snapshot.mode = OperationMode::default();
    }

    /// Device info registered alongside the entity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or unique id is empty.
    pub fn device_info(&self, model: Option<&str>) -> Result<Device, ValidationError> {
        Device::builder()
            .id(self.device_id)
            .name(&self.name)
            .manufacturer(MANUFACTURER)
            .model(model.unwrap_or("4iE"))
            .integration(crate::DOMAIN)
            .unique_id(&self.unique_id)
            .build()
    }

    /// Render the adapter as a host entity, every field from the same poll.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or unique id is empty.
    pub fn to_entity(&self) -> Result<Entity, ValidationError> {
        let snapshot = self.lock_snapshot();
        let mode = snapshot.mode;
        let mut builder = Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(format!("climate.{}", slugify(&self.unique_id)))
            .unique_id(&self.unique_id)
            .friendly_name(&self.name)
            .device_class(self.device_class())
            .state(snapshot.state())
            .supported_features(self.supported_features())
            .attribute("operation_mode", mode.as_str())
            .attribute("hvac_mode", mode.hvac_mode().as_str())
            .attribute(
                "hvac_modes",
                HvacMode::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect::<Vec<_>>(),
            )
            .attribute("preset_mode", mode.preset_mode().as_str())
            .attribute(
                "preset_modes",
                PresetMode::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect::<Vec<_>>(),
            )
            .attribute("unit_of_measurement", CELSIUS);
        if let Some(reading) = &snapshot.reading {
            builder = builder
                .attribute("current_temperature", reading.current_temperature)
                .attribute("temperature", reading.target_temperature)
                .attribute("min_temp", reading.min_temp)
                .attribute("max_temp", reading.max_temp);
        }
        builder.build()
    }
}
