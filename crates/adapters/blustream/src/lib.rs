//! # devicehub-adapter-blustream
//!
//! Integration for Blustream HDBaseT video matrices, exposed to the host as
//! a single `media_player` entity per configured matrix.
//!
//! ## Entry settings
//!
//! | Key | Required | Notes |
//! |-----|----------|-------|
//! | `host` | yes | hostname or IP address |
//! | `port` | yes | `1..=65535`, integer or numeric string |
//! | `name` | no | defaults to `"Blustream"` |
//!
//! ## Services
//!
//! `turn_on`, `turn_off`, `select_source`.
//!
//! ## Dependency rule
//!
//! Depends on `devicehub-app` (port traits, blocking plumbing) and
//! `devicehub-domain` only. Vendor bindings plug in through
//! [`MatrixConnector`]; [`simulated`] ships an in-memory matrix.

pub mod config;
pub mod error;
pub mod handle;
pub mod matrix;
pub mod simulated;

use devicehub_app::availability::DEFAULT_FAILURE_THRESHOLD;
use devicehub_app::executor::BlockingExecutor;
use devicehub_app::ports::{Integration, IntegrationContext};
use devicehub_domain::config_entry::ConfigEntry;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::{DeviceError, DeviceHubError, NotFoundError, ValidationError};
use devicehub_domain::id::EntityId;
use devicehub_domain::service::Service;

pub use config::MatrixConfig;
pub use handle::{MatrixConnector, MatrixHandle};
pub use matrix::MatrixDevice;

/// Integration domain.
pub const DOMAIN: &str = "blustream";

/// Blustream integration bound to one config entry.
pub struct BlustreamIntegration<C: MatrixConnector> {
    entry: ConfigEntry,
    connector: C,
    executor: BlockingExecutor,
    failure_threshold: u32,
    device: Option<MatrixDevice<C::Handle>>,
}

impl<C: MatrixConnector> BlustreamIntegration<C> {
    pub fn new(entry: ConfigEntry, connector: C) -> Self {
        Self {
            entry,
            connector,
            executor: BlockingExecutor::default(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            device: None,
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

    /// The adapter, once setup succeeded.
    #[must_use]
    pub fn device(&self) -> Option<&MatrixDevice<C::Handle>> {
        self.device.as_ref()
    }

    async fn register(
        &self,
        device: &MatrixDevice<C::Handle>,
        ctx: &impl IntegrationContext,
    ) -> Result<Entity, DeviceHubError> {
        let info = device.device_info(self.entry.title.as_deref())?;
        let entity = device.to_entity()?;
        ctx.register(info, entity).await
    }
}

impl<C: MatrixConnector> Integration for BlustreamIntegration<C> {
    fn name(&self) -> &'static str {
        DOMAIN
    }

    #[tracing::instrument(skip_all, fields(entry_id = %self.entry.entry_id))]
    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), DeviceHubError> {
        let config = MatrixConfig::from_data(&self.entry.data)?;
        let unique_id = self
            .entry
            .unique_id
            .clone()
            .unwrap_or_else(|| config.default_unique_id());

        let connector = self.connector.clone();
        let (host, port) = (config.host.clone(), config.port);
        let handle = self
            .executor
            .run("connect", move || connector.connect(&host, port))
            .await
            .map_err(DeviceHubError::NotReady)?;

        let device = MatrixDevice::new(
            config.name,
            unique_id,
            handle,
            self.executor,
            self.failure_threshold,
        );
        if !device.poll().await {
            device.release().await;
            return Err(DeviceHubError::NotReady(DeviceError::FetchFailed));
        }
        if let Err(err) = self.register(&device, ctx).await {
            device.release().await;
            return Err(err);
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            unique_id = device.unique_id(),
            "matrix set up"
        );
        self.device = Some(device);
        Ok(())
    }

    async fn poll(&self, ctx: &impl IntegrationContext) {
        let Some(device) = &self.device else {
            return;
        };
        device.poll().await;
        match device.to_entity() {
            Ok(entity) => {
                if let Err(err) = ctx.update_entity(entity).await {
                    tracing::warn!(unique_id = device.unique_id(), error = %err, "failed to store matrix state");
                }
            }
            Err(err) => {
                tracing::warn!(unique_id = device.unique_id(), error = %err, "invalid matrix entity");
            }
        }
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, DeviceHubError> {
        let device = self
            .device
            .as_ref()
            .filter(|device| device.entity_id() == entity_id)
            .ok_or_else(|| NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            })?;

        match Service::parse(service, &data)? {
            Service::TurnOn => device.turn_on().await?,
            Service::TurnOff => device.turn_off().await?,
            Service::SelectSource { source } => device.select_source(&source).await?,
            other => return Err(ValidationError::UnknownService(other.name().to_string()).into()),
        }
        Ok(device.to_entity()?)
    }

    async fn teardown(&mut self, ctx: &impl IntegrationContext) -> Result<(), DeviceHubError> {
        let Some(device) = self.device.take() else {
            return Ok(());
        };
        let result = ctx.unregister(device.entity_id()).await;
        device.release().await;
        tracing::info!(unique_id = device.unique_id(), "matrix removed");
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use devicehub_app::event_bus::InProcessEventBus;
    use devicehub_app::memory_store::{InMemoryDeviceRepository, InMemoryEntityRepository};
    use devicehub_app::services::device_service::DeviceService;
    use devicehub_app::services::entity_service::EntityService;
    use devicehub_app::services::integration_context::ServiceContext;
    use devicehub_domain::entity::EntityState;
    use serde_json::json;

    use super::*;
    use crate::simulated::{SimulatedConnector, SimulatedDevice};

    type TestContext =
        ServiceContext<InMemoryDeviceRepository, InMemoryEntityRepository, Arc<InProcessEventBus>>;

    fn make_context() -> (TestContext, Arc<EntityService<InMemoryEntityRepository, Arc<InProcessEventBus>>>)
    {
        let bus = Arc::new(InProcessEventBus::new(64));
        let entities = Arc::new(EntityService::new(
            InMemoryEntityRepository::default(),
            Arc::clone(&bus),
        ));
        let ctx = ServiceContext::new(
            Arc::new(DeviceService::new(InMemoryDeviceRepository::default())),
            Arc::clone(&entities),
            bus,
        );
        (ctx, entities)
    }

    fn entry() -> ConfigEntry {
        ConfigEntry::new("entry-1", DOMAIN, json!({"host": "10.0.0.5", "port": 23}))
    }

    fn integration(
        entry: ConfigEntry,
        device: &SimulatedDevice,
    ) -> BlustreamIntegration<SimulatedConnector> {
        BlustreamIntegration::new(entry, SimulatedConnector::new(device.clone()))
            .with_executor(BlockingExecutor::new(Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn should_register_matrix_entity_on_setup() {
        let (ctx, entities) = make_context();
        let device = SimulatedDevice::default();
        let mut integration = integration(entry(), &device);

        integration.setup(&ctx).await.unwrap();

        let all = entities.list_entities().await.unwrap();
        assert_eq!(all.len(), 1);
        let config = MatrixConfig::from_data(&entry().data).unwrap();
        assert_eq!(all[0].unique_id, config.default_unique_id());
        assert_eq!(all[0].friendly_name, "Blustream");
        assert_eq!(all[0].state, EntityState::Off);
    }

    #[tokio::test]
    async fn should_prefer_entry_unique_id() {
        let (ctx, entities) = make_context();
        let device = SimulatedDevice::default();
        let mut integration = integration(entry().with_unique_id("rack-1"), &device);

        integration.setup(&ctx).await.unwrap();

        let all = entities.list_entities().await.unwrap();
        assert_eq!(all[0].unique_id, "rack-1");
    }

    #[tokio::test]
    async fn should_fail_validation_before_connecting() {
        let (ctx, _) = make_context();
        let device = SimulatedDevice::default();
        let bad = ConfigEntry::new("entry-1", DOMAIN, json!({"host": "10.0.0.5"}));
        let mut integration = integration(bad, &device);

        let result = integration.setup(&ctx).await;
        assert!(matches!(
            result,
            Err(DeviceHubError::Validation(ValidationError::MissingField("port")))
        ));
        assert!(integration.device().is_none());
    }

    #[tokio::test]
    async fn should_report_not_ready_when_unreachable() {
        let (ctx, entities) = make_context();
        let device = SimulatedDevice::default();
        device.set_reachable(false);
        let mut integration = integration(entry(), &device);

        let result = integration.setup(&ctx).await;
        assert!(matches!(result, Err(DeviceHubError::NotReady(_))));
        assert!(entities.list_entities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_duplicate_unique_id() {
        let (ctx, _) = make_context();
        let device = SimulatedDevice::default();
        let mut first = integration(entry(), &device);
        let mut second = integration(entry(), &device);

        first.setup(&ctx).await.unwrap();
        let result = second.setup(&ctx).await;

        assert!(matches!(result, Err(DeviceHubError::Conflict(_))));
        assert!(second.device().is_none());
    }

    #[tokio::test]
    async fn should_apply_commands_on_next_poll() {
        let (ctx, entities) = make_context();
        let device = SimulatedDevice::default();
        let mut integration = integration(entry(), &device);
        integration.setup(&ctx).await.unwrap();
        let entity_id = integration.device().unwrap().entity_id();

        let returned = integration
            .handle_service_call(entity_id, "turn_on", json!({}))
            .await
            .unwrap();
        assert_eq!(returned.state, EntityState::Off);
        assert!(device.is_powered());

        integration
            .handle_service_call(entity_id, "select_source", json!({"source": "Input 2"}))
            .await
            .unwrap();
        integration.poll(&ctx).await;

        let stored = entities.get_entity(entity_id).await.unwrap();
        assert_eq!(stored.state, EntityState::On);
        assert_eq!(device.routed_source().as_deref(), Some("Input 2"));
    }

    #[tokio::test]
    async fn should_reject_thermostat_services() {
        let (ctx, _) = make_context();
        let device = SimulatedDevice::default();
        let mut integration = integration(entry(), &device);
        integration.setup(&ctx).await.unwrap();
        let entity_id = integration.device().unwrap().entity_id();

        let result = integration
            .handle_service_call(entity_id, "set_temperature", json!({"temperature": 21}))
            .await;
        assert!(matches!(
            result,
            Err(DeviceHubError::Validation(ValidationError::UnknownService(_)))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_foreign_entity() {
        let (ctx, _) = make_context();
        let device = SimulatedDevice::default();
        let mut integration = integration(entry(), &device);
        integration.setup(&ctx).await.unwrap();

        let result = integration
            .handle_service_call(EntityId::from_unique_id("other"), "turn_on", json!({}))
            .await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_unregister_on_teardown() {
        let (ctx, entities) = make_context();
        let device = SimulatedDevice::default();
        let mut integration = integration(entry(), &device);
        integration.setup(&ctx).await.unwrap();

        integration.teardown(&ctx).await.unwrap();

        assert!(entities.list_entities().await.unwrap().is_empty());
        assert!(integration.device().is_none());
        assert!(integration.teardown(&ctx).await.is_ok());
    }
}
