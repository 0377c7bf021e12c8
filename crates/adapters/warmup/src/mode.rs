//! Mapping from vendor run modes to the host climate model.

use std::fmt;

use devicehub_domain::climate::{HvacMode, PresetMode};

/// Operating mode derived from the vendor run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationMode {
    Off,
    /// Following the weekly program.
    #[default]
    Auto,
    /// Holding a fixed setpoint.
    Manual,
    Frost,
    Away,
}

impl OperationMode {
    /// Classify a raw run mode. Unknown modes count as manual.
    #[must_use]
    pub fn from_run_mode(run_mode: &str) -> Self {
        match run_mode {
            "off" => Self::Off,
            "prog" => Self::Auto,
            "fixed" => Self::Manual,
            "frost" => Self::Frost,
            "away" => Self::Away,
            _ => Self::Manual,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Frost => "frost",
            Self::Away => "away",
        }
    }

    #[must_use]
    pub fn hvac_mode(self) -> HvacMode {
        match self {
            Self::Off => HvacMode::Off,
            Self::Auto => HvacMode::Auto,
            Self::Manual | Self::Frost | Self::Away => HvacMode::Heat,
        }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        self != Self::Off
    }

    #[must_use]
    pub fn is_away(self) -> bool {
        self == Self::Away
    }

    #[must_use]
    pub fn preset_mode(self) -> PresetMode {
        if self.is_away() {
            PresetMode::Away
        } else {
            PresetMode::None
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_known_run_modes() {
        assert_eq!(OperationMode::from_run_mode("off"), OperationMode::Off);
        assert_eq!(OperationMode::from_run_mode("prog"), OperationMode::Auto);
        assert_eq!(OperationMode::from_run_mode("fixed"), OperationMode::Manual);
        assert_eq!(OperationMode::from_run_mode("frost"), OperationMode::Frost);
        assert_eq!(OperationMode::from_run_mode("away"), OperationMode::Away);
    }

    #[test]
    fn should_treat_unknown_run_mode_as_manual() {
        assert_eq!(OperationMode::from_run_mode("boost"), OperationMode::Manual);
        assert_eq!(OperationMode::from_run_mode(""), OperationMode::Manual);
    }

    #[test]
    fn should_default_to_auto() {
        let mode = OperationMode::default();
        assert_eq!(mode, OperationMode::Auto);
        assert!(mode.is_on());
        assert!(!mode.is_away());
    }

    #[test]
    fn should_derive_hvac_mode() {
        assert_eq!(OperationMode::Off.hvac_mode(), HvacMode::Off);
        assert_eq!(OperationMode::Auto.hvac_mode(), HvacMode::Auto);
        assert_eq!(OperationMode::Manual.hvac_mode(), HvacMode::Heat);
        assert_eq!(OperationMode::Frost.hvac_mode(), HvacMode::Heat);
        assert_eq!(OperationMode::Away.hvac_mode(), HvacMode::Heat);
    }

    #[test]
    fn should_flag_only_away_as_away() {
        assert!(OperationMode::Away.is_away());
        assert_eq!(OperationMode::Away.preset_mode(), PresetMode::Away);
        assert!(!OperationMode::Frost.is_away());
        assert_eq!(OperationMode::Frost.preset_mode(), PresetMode::None);
    }

    #[test]
    fn should_be_off_only_in_off_mode() {
        assert!(!OperationMode::Off.is_on());
        assert!(OperationMode::Frost.is_on());
        assert!(OperationMode::Manual.is_on());
    }
}
