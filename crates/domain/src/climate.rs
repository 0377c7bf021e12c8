//! Climate vocabulary shared by thermostat integrations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unit every climate entity reports temperatures in.
pub const CELSIUS: &str = "\u{b0}C";

/// Host-level HVAC operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Off,
    Heat,
    Auto,
}

impl HvacMode {
    /// Every mode a heating-only thermostat can offer.
    pub const ALL: [Self; 3] = [Self::Off, Self::Heat, Self::Auto];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "auto" => Ok(Self::Auto),
            other => Err(ValidationError::InvalidField {
                field: "hvac_mode",
                reason: format!("unsupported mode `{other}`"),
            }),
        }
    }
}

/// Host-level preset applied on top of the HVAC mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    None,
    Away,
}

impl PresetMode {
    pub const ALL: [Self; 2] = [Self::None, Self::Away];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "away" => Ok(Self::Away),
            other => Err(ValidationError::InvalidField {
                field: "preset_mode",
                reason: format!("unsupported preset `{other}`"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_every_displayed_hvac_mode() {
        for mode in HvacMode::ALL {
            assert_eq!(mode.to_string().parse::<HvacMode>().unwrap(), mode);
        }
    }

    #[test]
    fn should_reject_cool_hvac_mode() {
        let err = "cool".parse::<HvacMode>().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField {
                field: "hvac_mode",
                ..
            }
        ));
    }

    #[test]
    fn should_parse_away_preset() {
        assert_eq!("away".parse::<PresetMode>().unwrap(), PresetMode::Away);
    }

    #[test]
    fn should_reject_unknown_preset() {
        assert!("boost".parse::<PresetMode>().is_err());
    }
}
