//! Builds one integration per config entry.
//!
//! The integration port is not object safe, so the daemon dispatches through
//! an enum instead of a trait object. Vendor bindings are not linked in;
//! every entry runs against the adapter's simulated device.

use devicehub_adapter_blustream::BlustreamIntegration;
use devicehub_adapter_blustream::simulated::{
    SimulatedConnector as SimulatedMatrixConnector, SimulatedDevice,
};
use devicehub_adapter_warmup::{ThermostatConfig, WarmupIntegration};
use devicehub_adapter_warmup::simulated::{
    SimulatedConnector as SimulatedThermostatConnector, SimulatedRoom,
};
use devicehub_app::ports::{Integration, IntegrationContext};
use devicehub_domain::config_entry::ConfigEntry;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::DeviceHubError;
use devicehub_domain::id::EntityId;

use crate::config::{ConfigError, PollingConfig};

/// An integration built from a config entry.
pub enum ConfiguredIntegration {
    Blustream(BlustreamIntegration<SimulatedMatrixConnector>),
    Warmup(WarmupIntegration<SimulatedThermostatConnector>),
}

impl ConfiguredIntegration {
    /// Pick the integration for `entry.domain`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a domain no integration handles.
    pub fn from_entry(entry: ConfigEntry, polling: &PollingConfig) -> Result<Self, ConfigError> {
        let executor = polling.executor();
        match entry.domain.as_str() {
            devicehub_adapter_blustream::DOMAIN => {
                let connector = SimulatedMatrixConnector::new(SimulatedDevice::default());
                Ok(Self::Blustream(
                    BlustreamIntegration::new(entry, connector)
                        .with_executor(executor)
                        .with_failure_threshold(polling.failure_threshold),
                ))
            }
            devicehub_adapter_warmup::DOMAIN => {
                let connector = SimulatedThermostatConnector::new(simulated_room(&entry));
                Ok(Self::Warmup(
                    WarmupIntegration::new(entry, connector)
                        .with_executor(executor)
                        .with_failure_threshold(polling.failure_threshold),
                ))
            }
            other => Err(ConfigError::Validation(format!(
                "entry `{}` has unknown domain `{other}`",
                entry.entry_id
            ))),
        }
    }
}

// the simulated room answers for the location and room setup will ask for;
// invalid data is left for setup to report
fn simulated_room(entry: &ConfigEntry) -> SimulatedRoom {
    ThermostatConfig::from_data(&entry.data).map_or_else(
        |_| SimulatedRoom::default(),
        |config| SimulatedRoom::new(config.location, config.room),
    )
}

impl Integration for ConfiguredIntegration {
    fn name(&self) -> &'static str {
        match self {
            Self::Blustream(inner) => inner.name(),
            Self::Warmup(inner) => inner.name(),
        }
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), DeviceHubError> {
        match self {
            Self::Blustream(inner) => inner.setup(ctx).await,
            Self::Warmup(inner) => inner.setup(ctx).await,
        }
    }

    fn should_poll(&self) -> bool {
        match self {
            Self::Blustream(inner) => inner.should_poll(),
            Self::Warmup(inner) => inner.should_poll(),
        }
    }

    async fn poll(&self, ctx: &impl IntegrationContext) {
        match self {
            Self::Blustream(inner) => inner.poll(ctx).await,
            Self::Warmup(inner) => inner.poll(ctx).await,
        }
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, DeviceHubError> {
        match self {
            Self::Blustream(inner) => inner.handle_service_call(entity_id, service, data).await,
            Self::Warmup(inner) => inner.handle_service_call(entity_id, service, data).await,
        }
    }

    async fn teardown(&mut self, ctx: &impl IntegrationContext) -> Result<(), DeviceHubError> {
        match self {
            Self::Blustream(inner) => inner.teardown(ctx).await,
            Self::Warmup(inner) => inner.teardown(ctx).await,
        }
    }
}
