//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `devicehub.toml` in the working directory, or at the path named
//! by `DEVICEHUB_CONFIG`. Every section has a default so the file is
//! optional; without `[[entries]]` the daemon simply supervises nothing.
//!
//! ```toml
//! [polling]
//! interval_secs = 30
//!
//! [[entries]]
//! entry_id = "living-room-matrix"
//! domain = "blustream"
//! data = { host = "10.0.0.5", port = 23 }
//! ```

use std::collections::HashSet;
use std::time::Duration;

use devicehub_app::availability::DEFAULT_FAILURE_THRESHOLD;
use devicehub_app::executor::{BlockingExecutor, DEFAULT_CALL_TIMEOUT};
use devicehub_app::lifecycle::LifecycleSettings;
use devicehub_domain::config_entry::ConfigEntry;
use serde::Deserialize;

const DEFAULT_PATH: &str = "devicehub.toml";

/// Domains the daemon knows how to build.
pub const KNOWN_DOMAINS: [&str; 2] = [
    devicehub_adapter_blustream::DOMAIN,
    devicehub_adapter_warmup::DOMAIN,
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Polling and device call settings shared by all entries.
    pub polling: PollingConfig,
    /// Event bus settings.
    pub events: EventsConfig,
    /// Configured integration instances.
    pub entries: Vec<ConfigEntry>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two polls of the same entry.
    pub interval_secs: u64,
    /// Consecutive poll failures before an entity turns unavailable.
    pub failure_threshold: u32,
    /// Upper bound for one blocking device call.
    pub call_timeout_secs: u64,
    /// Delay before retrying a setup that found the device not ready.
    pub setup_retry_secs: u64,
}

/// Event bus configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity.
    pub capacity: usize,
}

impl Config {
    /// Load configuration from `devicehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DEVICEHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("DEVICEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = var("DEVICEHUB_POLL_INTERVAL").and_then(|val| val.parse().ok()) {
            self.polling.interval_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling.interval_secs must be non-zero".to_string(),
            ));
        }
        if self.polling.call_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "polling.call_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.events.capacity == 0 {
            return Err(ConfigError::Validation(
                "events.capacity must be non-zero".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.entry_id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate entry_id `{}`",
                    entry.entry_id
                )));
            }
            if !KNOWN_DOMAINS.contains(&entry.domain.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "entry `{}` has unknown domain `{}`",
                    entry.entry_id, entry.domain
                )));
            }
        }
        Ok(())
    }
}

impl PollingConfig {
    /// Timings handed to the lifecycle supervisor.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleSettings {
        LifecycleSettings {
            poll_interval: Duration::from_secs(self.interval_secs),
            setup_retry: Duration::from_secs(self.setup_retry_secs),
        }
    }

    #[must_use]
    pub fn executor(&self) -> BlockingExecutor {
        BlockingExecutor::new(Duration::from_secs(self.call_timeout_secs))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "devicehubd=info,devicehub_app=info,devicehub_adapter_blustream=info,devicehub_adapter_warmup=info".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        let lifecycle = LifecycleSettings::default();
        Self {
            interval_secs: lifecycle.poll_interval.as_secs(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
            setup_retry_secs: lifecycle.setup_retry.as_secs(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.polling.failure_threshold, 3);
        assert_eq!(config.polling.call_timeout_secs, 10);
        assert_eq!(config.polling.setup_retry_secs, 60);
        assert_eq!(config.events.capacity, 256);
        assert!(config.entries.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.polling.interval_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [logging]
            filter = "debug"

            [polling]
            interval_secs = 15
            failure_threshold = 5
            call_timeout_secs = 4
            setup_retry_secs = 20

            [events]
            capacity = 32

            [[entries]]
            entry_id = "rack"
            domain = "blustream"
            title = "CMX88AB"
            data = { host = "10.0.0.5", port = 23 }

            [[entries]]
            entry_id = "bathroom"
            domain = "warmup"
            unique_id = "floor-1"

            [entries.data]
            username = "user@example.com"
            password = "secret"
            location = "Home"
            room = "Bathroom"
            target_temp = 22.5
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.polling.lifecycle().poll_interval, Duration::from_secs(15));
        assert_eq!(config.polling.lifecycle().setup_retry, Duration::from_secs(20));
        assert_eq!(config.polling.executor().timeout(), Duration::from_secs(4));
        assert_eq!(config.polling.failure_threshold, 5);
        assert_eq!(config.events.capacity, 32);

        assert_eq!(config.entries.len(), 2);
        assert_eq!(config.entries[0].title.as_deref(), Some("CMX88AB"));
        assert_eq!(config.entries[0].data["port"], serde_json::json!(23));
        assert_eq!(config.entries[1].unique_id.as_deref(), Some("floor-1"));
        assert_eq!(config.entries[1].data["target_temp"], serde_json::json!(22.5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_default_entry_data_to_empty_object() {
        let toml = r#"
            [[entries]]
            entry_id = "rack"
            domain = "blustream"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.entries[0].data, serde_json::json!({}));
    }

    #[test]
    fn should_reject_malformed_toml() {
        assert!(toml::from_str::<Config>("[polling\ninterval_secs = 1").is_err());
    }

    #[test]
    fn should_fall_back_to_defaults_when_file_missing() {
        let config = Config::from_file("/nonexistent/devicehub.toml").unwrap();
        assert_eq!(config.polling.interval_secs, 30);
    }

    #[test]
    fn should_let_rust_log_win_over_devicehub_log() {
        let mut config = Config::default();
        config.apply_env_overrides(vars(&[("DEVICEHUB_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_override_poll_interval_from_env() {
        let mut config = Config::default();
        config.apply_env_overrides(vars(&[("DEVICEHUB_POLL_INTERVAL", "5")]));
        assert_eq!(config.polling.interval_secs, 5);
    }

    #[test]
    fn should_ignore_unparsable_poll_interval() {
        let mut config = Config::default();
        config.apply_env_overrides(vars(&[("DEVICEHUB_POLL_INTERVAL", "soon")]));
        assert_eq!(config.polling.interval_secs, 30);
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.polling.interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_call_timeout() {
        let mut config = Config::default();
        config.polling.call_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_event_capacity() {
        let mut config = Config::default();
        config.events.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_duplicate_entry_ids() {
        let mut config = Config::default();
        config.entries = vec![
            ConfigEntry::new("rack", "blustream", serde_json::json!({})),
            ConfigEntry::new("rack", "warmup", serde_json::json!({})),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate entry_id `rack`"));
    }

    #[test]
    fn should_reject_unknown_domain() {
        let mut config = Config::default();
        config.entries = vec![ConfigEntry::new("tv", "bravia", serde_json::json!({}))];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown domain `bravia`"));
    }
}
