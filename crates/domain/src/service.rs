//! Service — a typed command addressed to an entity.
//!
//! Hosts deliver calls as a name plus loosely typed data
//! (`"set_temperature"`, `{"temperature": 21.5}`); [`Service::parse`]
//! validates both before an integration sees them.

use serde::Deserialize;

use crate::climate::{HvacMode, PresetMode};
use crate::config_value::{self, float, required, text};
use crate::error::ValidationError;

/// A validated service call.
#[derive(Debug, Clone, PartialEq)]
pub enum Service {
    TurnOn,
    TurnOff,
    SelectSource { source: String },
    SetTemperature { temperature: f64 },
    SetHvacMode { hvac_mode: HvacMode },
    SetPresetMode { preset_mode: PresetMode },
}

impl Service {
    /// Parse a service name and its data.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownService`] for unsupported names and
    /// field errors when the data does not carry the expected arguments.
    pub fn parse(name: &str, data: &serde_json::Value) -> Result<Self, ValidationError> {
        let args: ServiceArgs = if data.is_null() {
            ServiceArgs::default()
        } else {
            config_value::from_data(data)?
        };
        match name {
            "turn_on" => Ok(Self::TurnOn),
            "turn_off" => Ok(Self::TurnOff),
            "select_source" => Ok(Self::SelectSource {
                source: required("source", args.source)?,
            }),
            "set_temperature" => Ok(Self::SetTemperature {
                temperature: args
                    .temperature
                    .ok_or(ValidationError::MissingField("temperature"))?,
            }),
            "set_hvac_mode" => Ok(Self::SetHvacMode {
                hvac_mode: required("hvac_mode", args.hvac_mode)?.parse()?,
            }),
            "set_preset_mode" => Ok(Self::SetPresetMode {
                preset_mode: required("preset_mode", args.preset_mode)?.parse()?,
            }),
            other => Err(ValidationError::UnknownService(other.to_string())),
        }
    }

    /// Service name as delivered by the host.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::SelectSource { .. } => "select_source",
            Self::SetTemperature { .. } => "set_temperature",
            Self::SetHvacMode { .. } => "set_hvac_mode",
            Self::SetPresetMode { .. } => "set_preset_mode",
        }
    }
}

/// Arguments any service may carry.
#[derive(Debug, Default, Deserialize)]
struct ServiceArgs {
    #[serde(default, deserialize_with = "text")]
    source: Option<String>,
    #[serde(default, deserialize_with = "float")]
    temperature: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    hvac_mode: Option<String>,
    #[serde(default, deserialize_with = "text")]
    preset_mode: Option<String>,
}
