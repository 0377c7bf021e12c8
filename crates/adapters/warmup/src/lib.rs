//! # devicehub-adapter-warmup
//!
//! Integration for Warmup 4iE floor-heating thermostats, exposed to the host
//! as one `climate` entity per configured room.
//!
//! ## Entry settings
//!
//! | Key | Required | Notes |
//! |-----|----------|-------|
//! | `username` | yes | vendor cloud account |
//! | `password` | yes | never logged |
//! | `location` | yes | location name as shown in the vendor app |
//! | `room` | yes | room name within the location |
//! | `name` | no | defaults to `"warmup4ie"` |
//! | `target_temp` | no | defaults to `20.0`, numbers or numeric strings |
//!
//! ## Services
//!
//! `turn_on`, `turn_off`, `set_temperature`, `set_hvac_mode`,
//! `set_preset_mode`.
//!
//! ## Run modes
//!
//! | Vendor | Operation | HVAC | Preset |
//! |--------|-----------|------|--------|
//! | `off` | off | off | none |
//! | `prog` | auto | auto | none |
//! | `fixed` | manual | heat | none |
//! | `frost` | frost | heat | none |
//! | `away` | away | heat | away |
//! | other | manual | heat | none |

pub mod config;
pub mod error;
pub mod handle;
pub mod mode;
pub mod simulated;
pub mod thermostat;

use devicehub_app::availability::DEFAULT_FAILURE_THRESHOLD;
use devicehub_app::executor::BlockingExecutor;
use devicehub_app::ports::{Integration, IntegrationContext};
use devicehub_domain::config_entry::ConfigEntry;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::{DeviceError, DeviceHubError, NotFoundError, ValidationError};
use devicehub_domain::id::EntityId;
use devicehub_domain::service::Service;

pub use config::ThermostatConfig;
pub use handle::{ThermostatConnector, ThermostatHandle};
pub use mode::OperationMode;
pub use thermostat::WarmupThermostat;

/// Integration domain.
pub const DOMAIN: &str = "warmup";

/// Warmup integration bound to one config entry.
pub struct WarmupIntegration<C: ThermostatConnector> {
    entry: ConfigEntry,
    connector: C,
    executor: BlockingExecutor,
    failure_threshold: u32,
    thermostat: Option<WarmupThermostat<C::Handle>>,
}

impl<C: ThermostatConnector> WarmupIntegration<C> {
    pub fn new(entry: ConfigEntry, connector: C) -> Self {
        Self {
            entry,
            connector,
            executor: BlockingExecutor::default(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            thermostat: None,
        }
    }

    #[must_use]
    pub fn with_executor(mut self, executor: BlockingExecutor) -> Self {
        self.executor = executor;
        self
    }

    #[must_use]
    pub fn with_failure_threshold(mut self, failure_threshold: u32) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    #[must_use]
    pub fn thermostat(&self) -> Option<&WarmupThermostat<C::Handle>> {
        self.thermostat.as_ref()
    }

    async fn register(
        &self,
        thermostat: &WarmupThermostat<C::Handle>,
        ctx: &impl IntegrationContext,
    ) -> Result<Entity, DeviceHubError> {
        let info = thermostat.device_info(self.entry.title.as_deref())?;
        let entity = thermostat.to_entity()?;
        ctx.register(info, entity).await
    }
}

impl<C: ThermostatConnector> Integration for WarmupIntegration<C> {
    fn name(&self) -> &'static str {
        DOMAIN
    }

    #[tracing::instrument(skip_all, fields(entry_id = %self.entry.entry_id))]
    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), DeviceHubError> {
        tracing::info!("setting up warmup thermostat");
        let config = ThermostatConfig::from_data(&self.entry.data)?;
        let unique_id = self
            .entry
            .unique_id
            .clone()
            .unwrap_or_else(|| config.default_unique_id());

        let connector = self.connector.clone();
        let session_config = config.clone();
        let session = self
            .executor
            .run("connect", move || connector.connect(&session_config))
            .await
            .map_err(DeviceHubError::NotReady)?;

        let thermostat = WarmupThermostat::new(
            config.name.clone(),
            unique_id,
            session,
            self.executor,
            self.failure_threshold,
        );
        if !thermostat.poll().await {
            thermostat.release().await;
            return Err(DeviceHubError::NotReady(DeviceError::FetchFailed));
        }
        if let Err(err) = self.register(&thermostat, ctx).await {
            thermostat.release().await;
            return Err(err);
        }

        tracing::info!(
            location = %config.location,
            room = %config.room,
            unique_id = thermostat.unique_id(),
            mode = %thermostat.operation_mode(),
            "thermostat set up"
        );
        self.thermostat = Some(thermostat);
        Ok(())
    }

    async fn poll(&self, ctx: &impl IntegrationContext) {
        let Some(thermostat) = &self.thermostat else {
            return;
        };
        thermostat.poll().await;
        match thermostat.to_entity() {
            Ok(entity) => {
                if let Err(err) = ctx.update_entity(entity).await {
                    tracing::warn!(unique_id = thermostat.unique_id(), error = %err, "failed to store thermostat state");
                }
            }
            Err(err) => {
                tracing::warn!(unique_id = thermostat.unique_id(), error = %err, "invalid thermostat entity");
            }
        }
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, DeviceHubError> {
        let thermostat = self
            .thermostat
            .as_ref()
            .filter(|thermostat| thermostat.entity_id() == entity_id)
            .ok_or_else(|| NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            })?;

        match Service::parse(service, &data)? {
            Service::TurnOn => thermostat.turn_on().await?,
            Service::TurnOff => thermostat.turn_off().await?,
            Service::SetTemperature { temperature } => {
                thermostat.set_temperature(temperature).await?;
            }
            Service::SetHvacMode { hvac_mode } => thermostat.set_hvac_mode(hvac_mode).await?,
            Service::SetPresetMode { preset_mode } => {
                thermostat.set_preset_mode(preset_mode).await?;
            }
            other @ Service::SelectSource { .. } => {
                return Err(ValidationError::UnknownService(other.name().to_string()).into());
            }
        }
        Ok(thermostat.to_entity()?)
    }

    async fn teardown(&mut self, ctx: &impl IntegrationContext) -> Result<(), DeviceHubError> {
        let Some(thermostat) = self.thermostat.take() else {
            return Ok(());
        };
        let result = ctx.unregister(thermostat.entity_id()).await;
        thermostat.release().await;
        tracing::info!(unique_id = thermostat.unique_id(), "thermostat removed");
        result
    }
}
