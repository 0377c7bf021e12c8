//! Typed identifier newtypes backed by UUIDs.
//!
//! Entities and devices get ids derived from their registry keys (UUID v5),
//! so re-running setup for the same config entry lands on the same record.
//! Events are random (UUID v4).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

const ENTITY_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6d2f_1b0e_9a4c_4e37_8f52_0c3d_7a91_e604);
const DEVICE_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x1c84_d3a7_52be_4f09_b6e1_93fa_28c5_4d7b);
const UNIQUE_ID_NAMESPACE: uuid::Uuid =
    uuid::Uuid::from_u128(0x9e05_7c4a_0d61_4b2f_a3d8_5f17_c6e2_b840);

/// Registry unique id for a record keyed by raw user-supplied values,
/// e.g. `warmup_5f0c…`.
///
/// Parts are length-prefixed before hashing, so different part lists yield
/// different ids whatever characters they contain.
#[must_use]
pub fn derived_unique_id(prefix: &str, parts: &[&str]) -> String {
    let mut name = Vec::new();
    for part in parts {
        let len = u64::try_from(part.len()).unwrap_or(u64::MAX);
        name.extend_from_slice(&len.to_be_bytes());
        name.extend_from_slice(part.as_bytes());
    }
    let hash = uuid::Uuid::new_v5(&UNIQUE_ID_NAMESPACE, &name);
    format!("{prefix}_{}", hash.simple())
}

define_id!(
    /// Unique identifier for an [`Entity`](crate::entity::Entity).
    EntityId
);

impl EntityId {
    /// Identifier derived from the entity's registry unique id.
    ///
    /// Entity unique ids are global, so the same unique id always yields the
    /// same identifier.
    #[must_use]
    pub fn from_unique_id(unique_id: &str) -> Self {
        Self(uuid::Uuid::new_v5(&ENTITY_NAMESPACE, unique_id.as_bytes()))
    }
}

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    ///
    /// The default is the nil id, used for entities not yet linked to a
    /// registered device.
    DeviceId
);

impl DeviceId {
    /// Identifier derived from the device's `(integration, unique_id)` key.
    #[must_use]
    pub fn for_device(integration: &str, unique_id: &str) -> Self {
        let key = format!("{integration}/{unique_id}");
        Self(uuid::Uuid::new_v5(&DEVICE_NAMESPACE, key.as_bytes()))
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self(uuid::Uuid::nil())
    }
}

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);

impl EventId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}
