//! Device — a physical thing that exposes one or more entities.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;

/// Device information registered alongside an integration's entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Integration domain that provided this device.
    pub integration: String,
    /// Stable identifier within the integration.
    pub unique_id: String,
}

impl Device {
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] or
    /// [`ValidationError::EmptyUniqueId`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.unique_id.trim().is_empty() {
            return Err(ValidationError::EmptyUniqueId);
        }
        Ok(())
    }
}

/// Builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: String,
    manufacturer: Option<String>,
    model: Option<String>,
    integration: String,
    unique_id: String,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = integration.into();
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    /// Build and validate the device.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if an invariant fails.
    pub fn build(self) -> Result<Device, ValidationError> {
        let device = Device {
            id: self
                .id
                .unwrap_or_else(|| DeviceId::for_device(&self.integration, &self.unique_id)),
            name: self.name,
            manufacturer: self.manufacturer,
            model: self.model,
            integration: self.integration,
            unique_id: self.unique_id,
        };
        device.validate()?;
        Ok(device)
    }
}
