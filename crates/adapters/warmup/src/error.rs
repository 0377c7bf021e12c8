//! Warmup adapter error types.

use devicehub_domain::error::DeviceError;

/// Errors raised by thermostat handles.
#[derive(Debug, thiserror::Error)]
pub enum WarmupError {
    /// The vendor cloud rejected the credentials.
    #[error("login rejected for `{username}`")]
    LoginRejected { username: String },

    /// The session never finished its setup (location or room lookup).
    #[error("vendor session setup incomplete")]
    SetupIncomplete,

    /// The configured room does not exist in the location.
    #[error("room `{room}` not found in location `{location}`")]
    RoomNotFound { location: String, room: String },

    /// The vendor cloud could not be reached.
    #[error("vendor cloud unreachable")]
    Unreachable,

    /// The requested target lies outside the room's bounds.
    #[error("target {value} outside {min}..={max}")]
    TemperatureOutOfRange { value: f64, min: f64, max: f64 },
}

impl WarmupError {
    /// Wrap into a [`DeviceError::Vendor`] for propagation across the handle
    /// boundary.
    pub fn into_device(self) -> DeviceError {
        DeviceError::vendor(self)
    }
}

impl From<WarmupError> for DeviceError {
    fn from(err: WarmupError) -> Self {
        err.into_device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_room_not_found() {
        let err = WarmupError::RoomNotFound {
            location: "Home".to_string(),
            room: "Attic".to_string(),
        };
        assert_eq!(err.to_string(), "room `Attic` not found in location `Home`");
    }

    #[test]
    fn should_convert_into_vendor_device_error() {
        let err: DeviceError = WarmupError::Unreachable.into();
        assert!(matches!(err, DeviceError::Vendor(_)));
    }
}
