//! Availability tracking from consecutive poll outcomes.

/// Default number of consecutive failed polls before an entity is reported
/// unavailable.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Counts consecutive poll failures for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityTracker {
    threshold: u32,
    consecutive_failures: u32,
}

impl Default for AvailabilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

impl AvailabilityTracker {
    /// A threshold of zero is treated as one.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
        }
    }

    /// Record a successful poll. Returns `true` if this restored availability.
    pub fn record_success(&mut self) -> bool {
        let was_available = self.is_available();
        self.consecutive_failures = 0;
        !was_available
    }

    /// Record a failed poll. Returns `true` if this crossed the threshold.
    pub fn record_failure(&mut self) -> bool {
        let was_available = self.is_available();
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        was_available && !self.is_available()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.consecutive_failures < self.threshold
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stay_available_below_threshold() {
        let mut tracker = AvailabilityTracker::new(3);
        assert!(!tracker.record_failure());
        assert!(!tracker.record_failure());
        assert!(tracker.is_available());
    }

    #[test]
    fn should_become_unavailable_at_threshold() {
        let mut tracker = AvailabilityTracker::new(3);
        tracker.record_failure();
        tracker.record_failure();
        assert!(tracker.record_failure());
        assert!(!tracker.is_available());
        assert!(!tracker.record_failure());
    }

    #[test]
    fn should_recover_on_success() {
        let mut tracker = AvailabilityTracker::new(1);
        tracker.record_failure();
        assert!(!tracker.is_available());

        assert!(tracker.record_success());
        assert!(tracker.is_available());
        assert_eq!(tracker.consecutive_failures(), 0);
    }

    #[test]
    fn should_treat_zero_threshold_as_one() {
        let mut tracker = AvailabilityTracker::new(0);
        assert!(tracker.is_available());
        tracker.record_failure();
        assert!(!tracker.is_available());
    }
}
