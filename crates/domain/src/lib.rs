//! # devicehub-domain
//!
//! Pure domain model for the devicehub device-adapter host.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity: media players, climates, …)
//! - Define **Devices** (physical things that expose one or more entities)
//! - Define **Config entries** (one user-configured integration instance)
//! - Define **Services** (commands: `turn_on`, `set_temperature`, …)
//! - Define **Events** (registration and state-change records)
//! - Coerce user-supplied configuration values into typed settings
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod climate;
pub mod config_entry;
pub mod config_value;
pub mod device;
pub mod entity;
pub mod event;
pub mod service;
