//! Per-entry lifecycle supervisor.
//!
//! [`supervise`] drives one [`Integration`] through setup, polling and
//! teardown. Setups failing with [`DeviceHubError::NotReady`] are retried
//! after a fixed delay; any other setup error ends the entry. Service calls
//! arrive over an [`EntryHandle`] and are handled between polls.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

use devicehub_domain::entity::Entity;
use devicehub_domain::error::{DeviceError, DeviceHubError};
use devicehub_domain::event::{Event, EventType};
use devicehub_domain::id::EntityId;

use crate::ports::{Integration, IntegrationContext};

/// Timing knobs for [`supervise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    pub poll_interval: Duration,
    pub setup_retry: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            setup_retry: Duration::from_secs(60),
        }
    }
}

/// A service call routed to a supervised integration.
#[derive(Debug)]
pub struct ServiceRequest {
    pub entity_id: EntityId,
    pub service: String,
    pub data: serde_json::Value,
    reply: oneshot::Sender<Result<Entity, DeviceHubError>>,
}

/// Sending side for service calls to one supervised entry.
#[derive(Debug, Clone)]
pub struct EntryHandle {
    sender: mpsc::Sender<ServiceRequest>,
}

impl EntryHandle {
    /// Forward a service call and wait for the integration's answer.
    ///
    /// # Errors
    ///
    /// Returns whatever the integration reports, or
    /// [`DeviceHubError::NotReady`] when the entry is no longer supervised.
    pub async fn call_service(
        &self,
        entity_id: EntityId,
        service: impl Into<String>,
        data: serde_json::Value,
    ) -> Result<Entity, DeviceHubError> {
        let (reply, response) = oneshot::channel();
        let request = ServiceRequest {
            entity_id,
            service: service.into(),
            data,
            reply,
        };
        self.sender
            .send(request)
            .await
            .map_err(|_| DeviceHubError::NotReady(DeviceError::Released))?;
        response
            .await
            .map_err(|_| DeviceHubError::NotReady(DeviceError::Released))?
    }
}

/// Create the channel feeding service calls into [`supervise`].
#[must_use]
pub fn service_channel(capacity: usize) -> (EntryHandle, mpsc::Receiver<ServiceRequest>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (EntryHandle { sender }, receiver)
}

fn is_shutdown(
    result: Result<(), watch::error::RecvError>,
    shutdown: &watch::Receiver<bool>,
) -> bool {
    result.is_err() || *shutdown.borrow()
}

/// Run one integration until `shutdown` flips to `true` (or its sender drops).
///
/// # Errors
///
/// Returns the setup error when it is not retryable, or the teardown error.
#[tracing::instrument(skip_all, fields(integration = integration.name()))]
pub async fn supervise<I, C>(
    mut integration: I,
    ctx: C,
    settings: LifecycleSettings,
    mut requests: mpsc::Receiver<ServiceRequest>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), DeviceHubError>
where
    I: Integration,
    C: IntegrationContext,
{
    loop {
        if *shutdown.borrow() {
            return Ok(());
        }
        match integration.setup(&ctx).await {
            Ok(()) => break,
            Err(DeviceHubError::NotReady(err)) => {
                tracing::warn!(
                    error = %err,
                    retry_secs = settings.setup_retry.as_secs(),
                    "device not ready, retrying setup"
                );
                tokio::select! {
                    () = tokio::time::sleep(settings.setup_retry) => {}
                    result = shutdown.changed() => {
                        if is_shutdown(result, &shutdown) {
                            return Ok(());
                        }
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "setup failed");
                return Err(err);
            }
        }
    }
    tracing::info!("integration started");

    let mut ticker = tokio::time::interval(settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // setup already observed the device once
    ticker.tick().await;

    loop {
        tokio::select! {
            result = shutdown.changed() => {
                if is_shutdown(result, &shutdown) {
                    break;
                }
            }
            _ = ticker.tick(), if integration.should_poll() => {
                integration.poll(&ctx).await;
            }
            Some(request) = requests.recv() => {
                let data = request.data.clone();
                let result = integration
                    .handle_service_call(request.entity_id, &request.service, request.data)
                    .await;
                match &result {
                    Ok(entity) => {
                        let event = Event::new(
                            EventType::ServiceCalled,
                            Some(entity.id),
                            serde_json::json!({"service": request.service, "data": data}),
                        );
                        if let Err(err) = ctx.publish(event).await {
                            tracing::warn!(error = %err, "failed to publish service call");
                        }
                    }
                    Err(err) => {
                        tracing::warn!(service = %request.service, error = %err, "service call failed");
                    }
                }
                // the caller may have given up waiting
                let _ = request.reply.send(result);
            }
        }
    }

    let result = integration.teardown(&ctx).await;
    match &result {
        Ok(()) => tracing::info!("integration stopped"),
        Err(err) => tracing::error!(error = %err, "teardown failed"),
    }
    result
}
