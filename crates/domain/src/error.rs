//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`DeviceHubError`] via `#[from]` when crossing a port boundary.

use std::time::Duration;

/// Top-level error returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum DeviceHubError {
    /// Configuration or entity invariant violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A record with the same unique id is already registered.
    #[error("conflict")]
    Conflict(#[from] ConflictError),

    /// The device could not be reached during setup; the host may retry later.
    #[error("device not ready")]
    NotReady(#[source] DeviceError),

    /// A command forwarded to the device failed.
    #[error("command `{service}` failed")]
    Command {
        service: &'static str,
        #[source]
        source: DeviceError,
    },
}

/// Invariant violations on configuration values and domain records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("config entry data must be an object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("config entry data is malformed: {0}")]
    InvalidData(String),

    #[error("name must not be empty")]
    EmptyName,

    #[error("entity_id must not be empty")]
    EmptyEntityId,

    #[error("entity_id `{0}` must look like `<domain>.<object_id>`")]
    MalformedEntityId(String),

    #[error("unique_id must not be empty")]
    EmptyUniqueId,

    #[error("unknown service `{0}`")]
    UnknownService(String),
}

/// A record looked up by id does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A record with the same unique id is already registered.
#[derive(Debug, thiserror::Error)]
#[error("{entity} with unique id {unique_id} already exists")]
pub struct ConflictError {
    pub entity: &'static str,
    pub unique_id: String,
}

/// Failure reported by, or while waiting on, a device handle.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The vendor library raised an error.
    #[error("vendor library error")]
    Vendor(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The vendor library reported that fresh state could not be fetched.
    #[error("device did not return fresh state")]
    FetchFailed,

    /// The offloaded call did not finish in time.
    #[error("`{operation}` timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The worker running the blocking call panicked or was cancelled.
    #[error("`{operation}` worker aborted")]
    Panicked { operation: &'static str },

    /// The handle was released when its config entry was removed.
    #[error("device handle already released")]
    Released,

    /// The request was refused before reaching the device.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl DeviceError {
    /// Wrap any vendor library error.
    pub fn vendor<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Vendor(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_devicehub_error() {
        let err: DeviceHubError = ValidationError::MissingField("host").into();
        assert!(matches!(
            err,
            DeviceHubError::Validation(ValidationError::MissingField("host"))
        ));
    }

    #[test]
    fn should_display_missing_field_with_its_name() {
        let err = ValidationError::MissingField("password");
        assert_eq!(err.to_string(), "missing required field `password`");
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Entity",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Entity abc not found");
    }

    #[test]
    fn should_display_timeout_with_operation_name() {
        let err = DeviceError::Timeout {
            operation: "update",
            after: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "`update` timed out after 2s");
    }

    #[test]
    fn should_keep_vendor_error_as_source() {
        let io = std::io::Error::other("socket closed");
        let err = DeviceError::vendor(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "socket closed");
    }
}
