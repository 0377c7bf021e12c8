//! Supported-feature flags advertised by an entity.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Set of commands an entity accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    pub const NONE: Self = Self(0);
    pub const TURN_ON: Self = Self(1);
    pub const TURN_OFF: Self = Self(1 << 1);
    pub const SELECT_SOURCE: Self = Self(1 << 2);
    pub const TARGET_TEMPERATURE: Self = Self(1 << 3);
    pub const PRESET_MODE: Self = Self(1 << 4);

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Flags set in either operand; usable in `const` items.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SupportedFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for SupportedFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_contain_combined_flags() {
        let features = SupportedFeatures::TURN_ON | SupportedFeatures::SELECT_SOURCE;
        assert!(features.contains(SupportedFeatures::TURN_ON));
        assert!(features.contains(SupportedFeatures::SELECT_SOURCE));
        assert!(!features.contains(SupportedFeatures::TURN_OFF));
    }

    #[test]
    fn should_contain_none_trivially() {
        assert!(SupportedFeatures::NONE.contains(SupportedFeatures::NONE));
        assert_eq!(SupportedFeatures::default().bits(), 0);
    }
}
