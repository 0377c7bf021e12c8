//! Blustream adapter error types.

use devicehub_domain::error::DeviceError;

/// Errors raised by matrix handles.
#[derive(Debug, thiserror::Error)]
pub enum BlustreamError {
    /// No matrix answered at the configured address.
    #[error("matrix at {host}:{port} unreachable")]
    Unreachable { host: String, port: u16 },

    /// The connection dropped after it was established.
    #[error("matrix connection lost")]
    ConnectionLost,

    /// The matrix does not know the requested input.
    #[error("unknown input source `{0}`")]
    UnknownSource(String),
}

impl BlustreamError {
    /// Wrap into a [`DeviceError::Vendor`] for propagation across the handle
    /// boundary.
    pub fn into_device(self) -> DeviceError {
        DeviceError::vendor(self)
    }
}

impl From<BlustreamError> for DeviceError {
    fn from(err: BlustreamError) -> Self {
        err.into_device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unreachable_error() {
        let err = BlustreamError::Unreachable {
            host: "10.0.0.5".to_string(),
            port: 23,
        };
        assert_eq!(err.to_string(), "matrix at 10.0.0.5:23 unreachable");
    }

    #[test]
    fn should_convert_into_vendor_device_error() {
        let err: DeviceError = BlustreamError::ConnectionLost.into();
        assert!(matches!(err, DeviceError::Vendor(_)));
    }
}
