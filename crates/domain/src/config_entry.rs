//! Config entry — one user-configured integration instance.

use serde::{Deserialize, Serialize};

/// A user-configured instance of an integration.
///
/// `data` holds the raw settings exactly as supplied; each integration
/// validates it before constructing any device handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Stable key of this entry in the host configuration.
    pub entry_id: String,
    /// Integration domain handling this entry (e.g. `"warmup"`).
    pub domain: String,
    /// Human readable title, used as device model when present.
    #[serde(default)]
    pub title: Option<String>,
    /// Explicit unique id; integrations derive one from `data` otherwise.
    #[serde(default)]
    pub unique_id: Option<String>,
    /// User settings.
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ConfigEntry {
    /// Create an entry with no title and no explicit unique id.
    pub fn new(
        entry_id: impl Into<String>,
        domain: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            domain: domain.into(),
            title: None,
            unique_id: None,
            data,
        }
    }

    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
