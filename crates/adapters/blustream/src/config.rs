//! Matrix entry configuration.

use devicehub_domain::config_value::{self, non_empty, port, required, text, unsigned};
use devicehub_domain::error::ValidationError;
use devicehub_domain::id::derived_unique_id;
use serde::Deserialize;

/// Display name used when the entry does not supply one.
pub const DEFAULT_NAME: &str = "Blustream";

/// Validated settings for one matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixConfig {
    /// Hostname or IP address of the matrix controller.
    pub host: String,
    /// TCP port of the matrix controller.
    pub port: u16,
    pub name: String,
}

#[derive(Deserialize)]
struct RawMatrixConfig {
    #[serde(default, deserialize_with = "text")]
    host: Option<String>,
    #[serde(default, deserialize_with = "unsigned")]
    port: Option<u64>,
    #[serde(default, deserialize_with = "text")]
    name: Option<String>,
}

impl MatrixConfig {
    /// Validate entry data.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn from_data(data: &serde_json::Value) -> Result<Self, ValidationError> {
        let raw: RawMatrixConfig = config_value::from_data(data)?;
        Ok(Self {
            host: required("host", raw.host)?,
            port: port("port", raw.port)?,
            name: non_empty("name", raw.name)?.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        })
    }

    /// Unique id used when the entry does not carry one.
    #[must_use]
    pub fn default_unique_id(&self) -> String {
        derived_unique_id("blustream", &[&self.host, &self.port.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_accept_minimal_settings() {
        let config = MatrixConfig::from_data(&json!({"host": "10.0.0.5", "port": 23})).unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 23);
        assert_eq!(config.name, DEFAULT_NAME);
    }

    #[test]
    fn should_accept_port_as_string() {
        let config =
            MatrixConfig::from_data(&json!({"host": "matrix.lan", "port": "8000", "name": "AV"}))
                .unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.name, "AV");
    }

    #[test]
    fn should_reject_missing_host() {
        let err = MatrixConfig::from_data(&json!({"port": 23})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("host"));
    }

    #[test]
    fn should_reject_blank_host() {
        let err = MatrixConfig::from_data(&json!({"host": "  ", "port": 23})).unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("host"));
    }

    #[test]
    fn should_require_port() {
        let err = MatrixConfig::from_data(&json!({"host": "10.0.0.5"})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("port"));
    }

    #[test]
    fn should_reject_out_of_range_port() {
        let err = MatrixConfig::from_data(&json!({"host": "10.0.0.5", "port": 70000})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "port", .. }));
    }

    #[test]
    fn should_reject_non_numeric_port() {
        let err = MatrixConfig::from_data(&json!({"host": "10.0.0.5", "port": "telnet"}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidData(_)));
    }

    #[test]
    fn should_derive_unique_id_from_host_and_port() {
        let config = MatrixConfig::from_data(&json!({"host": "10.0.0.5", "port": 23})).unwrap();
        assert!(config.default_unique_id().starts_with("blustream_"));
        let other_port =
            MatrixConfig::from_data(&json!({"host": "10.0.0.5", "port": 24})).unwrap();
        assert_ne!(config.default_unique_id(), other_port.default_unique_id());
    }

    #[test]
    fn should_not_collide_for_hosts_with_same_slug() {
        let dotted = MatrixConfig::from_data(&json!({"host": "10.0.0.5", "port": 23})).unwrap();
        let underscored =
            MatrixConfig::from_data(&json!({"host": "10_0_0_5", "port": 23})).unwrap();
        assert_ne!(dotted.default_unique_id(), underscored.default_unique_id());
    }
}
