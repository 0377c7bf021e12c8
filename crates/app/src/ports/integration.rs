//! Integration port — lifecycle, polling and service-call handling for
//! device integrations.
//!
//! One [`Integration`] value serves exactly one config entry: it validates
//! the entry, opens the device handle, registers its entity through the
//! [`IntegrationContext`] it is handed, and releases everything on teardown.
//! The context is passed explicitly on every call, so integrations never
//! reach for process-wide state.

use std::future::Future;

use devicehub_domain::device::Device;
use devicehub_domain::entity::Entity;
use devicehub_domain::error::DeviceHubError;
use devicehub_domain::event::Event;
use devicehub_domain::id::EntityId;

/// Host services available to an integration.
///
/// This is a **port**: adapters call it to make their entities visible.
/// The app crate provides [`ServiceContext`](crate::services::integration_context::ServiceContext)
/// backed by `DeviceService` and `EntityService`.
pub trait IntegrationContext: Send + Sync {
    /// Register a device and its entity under the entity's unique id.
    ///
    /// Fails with [`DeviceHubError::Conflict`] when the unique id is taken.
    fn register(
        &self,
        device: Device,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send;

    /// Store a fresh snapshot of an already registered entity.
    ///
    /// Publishes `StateChanged` when the observation differs from the
    /// stored one.
    fn update_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send;

    /// Remove an entity and the device it belongs to.
    fn unregister(&self, entity_id: EntityId)
    -> impl Future<Output = Result<(), DeviceHubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DeviceHubError>> + Send;
}

/// A pluggable device integration bound to one config entry.
///
/// The host calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): validate, connect, register
/// 2. [`poll`](Self::poll) on a host-chosen interval while
///    [`should_poll`](Self::should_poll) holds, interleaved with
///    [`handle_service_call`](Self::handle_service_call)
/// 3. [`teardown`](Self::teardown): unregister and release the device
pub trait Integration: Send + Sync {
    /// Integration domain (e.g. `"blustream"`).
    fn name(&self) -> &'static str;

    /// Validate the config entry, open the device handle and register the
    /// entity.
    ///
    /// Configuration problems fail with [`DeviceHubError::Validation`]
    /// before any handle exists; an unreachable device fails with
    /// [`DeviceHubError::NotReady`] so the host may retry later.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), DeviceHubError>> + Send;

    /// Whether the host should call [`poll`](Self::poll) periodically.
    fn should_poll(&self) -> bool {
        true
    }

    /// Refresh cached state from the device and push it to the host.
    ///
    /// Failures are recovered inside the integration; nothing propagates.
    fn poll(&self, ctx: &impl IntegrationContext) -> impl Future<Output = ()> + Send;

    /// Forward a service call (e.g. `turn_on`, `set_temperature`) to the
    /// device owning `entity_id`.
    ///
    /// Returns the entity as last polled; the effect of the command becomes
    /// visible after the next poll.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, DeviceHubError>> + Send;

    /// Unregister the entity and release the device handle.
    fn teardown(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), DeviceHubError>> + Send;
}
