//! Thermostat entry configuration.

use std::fmt;

use devicehub_domain::config_value::{self, float, non_empty, required, text};
use devicehub_domain::error::ValidationError;
use devicehub_domain::id::derived_unique_id;
use serde::Deserialize;

/// Display name used when the entry does not supply one.
pub const DEFAULT_NAME: &str = "warmup4ie";

/// Target temperature handed to the vendor session when none is configured.
pub const DEFAULT_TARGET_TEMP: f64 = 20.0;

/// Validated settings for one thermostat room.
#[derive(Clone, PartialEq)]
pub struct ThermostatConfig {
    /// Vendor cloud account.
    pub username: String,
    pub password: String,
    /// Location (home) name as shown in the vendor app.
    pub location: String,
    /// Room name within the location.
    pub room: String,
    pub name: String,
    pub target_temp: f64,
}

impl fmt::Debug for ThermostatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThermostatConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("location", &self.location)
            .field("room", &self.room)
            .field("name", &self.name)
            .field("target_temp", &self.target_temp)
            .finish()
    }
}

/// Entry data as entered, before presence checks and defaults.
#[derive(Deserialize)]
struct RawThermostatConfig {
    #[serde(default, deserialize_with = "text")]
    username: Option<String>,
    #[serde(default, deserialize_with = "text")]
    password: Option<String>,
    #[serde(default, deserialize_with = "text")]
    location: Option<String>,
    #[serde(default, deserialize_with = "text")]
    room: Option<String>,
    #[serde(default, deserialize_with = "text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "float")]
    target_temp: Option<f64>,
}

impl ThermostatConfig {
    /// Validate entry data. Text values are kept exactly as entered.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn from_data(data: &serde_json::Value) -> Result<Self, ValidationError> {
        let raw: RawThermostatConfig = config_value::from_data(data)?;
        Ok(Self {
            username: required("username", raw.username)?,
            password: required("password", raw.password)?,
            location: required("location", raw.location)?,
            room: required("room", raw.room)?,
            name: non_empty("name", raw.name)?.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            target_temp: raw.target_temp.unwrap_or(DEFAULT_TARGET_TEMP),
        })
    }

    /// Unique id used when the entry does not carry one, derived from the
    /// account, location and room.
    #[must_use]
    pub fn default_unique_id(&self) -> String {
        derived_unique_id("warmup", &[&self.username, &self.location, &self.room])
    }
}
