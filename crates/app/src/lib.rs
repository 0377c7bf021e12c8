//! # devicehub-app
//!
//! Application layer — use-cases, **port definitions** (traits) and the
//! in-process host infrastructure integrations run against.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement or consume:
//!   - `Integration` — lifecycle of one configured integration instance
//!   - `IntegrationContext` — register / update / unregister entities
//!   - `EntityRepository`, `DeviceRepository` — entity registry storage
//!   - `EventPublisher` — publish domain events
//! - Provide the host services behind those ports (`EntityService`,
//!   `DeviceService`, `ServiceContext`, in-memory repositories, event bus)
//! - Provide the blocking-call plumbing adapters share: `BlockingExecutor`,
//!   `LockedHandle`, `AvailabilityTracker`
//! - Drive each config entry through setup, polling and teardown
//!   (`lifecycle::supervise`)
//!
//! ## Dependency rule
//! Depends on `devicehub-domain` only (plus `tokio` for sync, time and the
//! blocking pool). Never imports adapter crates.

pub mod availability;
pub mod device_lock;
pub mod event_bus;
pub mod executor;
pub mod lifecycle;
pub mod memory_store;
pub mod ports;
pub mod services;
