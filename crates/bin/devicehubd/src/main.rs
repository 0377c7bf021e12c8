//! # devicehubd — devicehub daemon
//!
//! Composition root that wires the host services together and supervises
//! one integration per configured entry.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Construct the in-memory registries, event bus and host services
//! - Build an integration for every `[[entries]]` table and run it under
//!   `lifecycle::supervise`
//! - Handle graceful shutdown (SIGINT): tear every entry down before exit
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod integrations;

use std::sync::Arc;

use devicehub_app::event_bus::InProcessEventBus;
use devicehub_app::lifecycle::{service_channel, supervise};
use devicehub_app::memory_store::{InMemoryDeviceRepository, InMemoryEntityRepository};
use devicehub_app::services::device_service::DeviceService;
use devicehub_app::services::entity_service::EntityService;
use devicehub_app::services::integration_context::ServiceContext;
use devicehub_domain::event::Event;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::integrations::ConfiguredIntegration;

const SERVICE_QUEUE: usize = 16;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(config.events.capacity));
    let event_log = tokio::spawn(log_events(event_bus.subscribe()));

    // Services
    let entity_service = Arc::new(EntityService::new(
        InMemoryEntityRepository::default(),
        Arc::clone(&event_bus),
    ));
    let device_service = Arc::new(DeviceService::new(InMemoryDeviceRepository::default()));
    let ctx = ServiceContext::new(device_service, entity_service, Arc::clone(&event_bus));

    // Entries
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let settings = config.polling.lifecycle();
    let mut handles = Vec::with_capacity(config.entries.len());
    let mut supervisors = JoinSet::new();
    for entry in config.entries {
        let entry_id = entry.entry_id.clone();
        let integration = ConfiguredIntegration::from_entry(entry, &config.polling)?;
        let (handle, requests) = service_channel(SERVICE_QUEUE);
        handles.push(handle);
        let ctx = ctx.clone();
        let shutdown = shutdown_rx.clone();
        supervisors.spawn(async move {
            let result = supervise(integration, ctx, settings, requests, shutdown).await;
            (entry_id, result)
        });
    }
    tracing::info!(entries = supervisors.len(), "devicehubd started");

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(err) => tracing::error!(error = %err, "failed to listen for shutdown signal"),
    }

    // Every entry tears down before the daemon exits
    let _ = shutdown_tx.send(true);
    drop(handles);
    while let Some(joined) = supervisors.join_next().await {
        match joined {
            Ok((entry_id, Ok(()))) => tracing::debug!(entry_id = %entry_id, "entry stopped"),
            Ok((entry_id, Err(err))) => tracing::error!(entry_id = %entry_id, error = %err, "entry failed"),
            Err(err) => tracing::error!(error = %err, "supervisor task panicked"),
        }
    }
    event_log.abort();

    tracing::info!("devicehubd shutdown complete");
    Ok(())
}

async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => tracing::info!(
                event_type = ?event.event_type,
                entity_id = ?event.entity_id,
                data = %event.data,
                "event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
