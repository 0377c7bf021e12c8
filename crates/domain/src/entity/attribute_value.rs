//! Typed attribute values attached to entities.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<String>),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_float_variant_as_number() {
        let json = serde_json::to_string(&AttributeValue::Float(21.5)).unwrap();
        assert_eq!(json, "21.5");
    }

    #[test]
    fn should_serialize_list_variant_as_array() {
        let value = AttributeValue::from(vec!["HDMI 1".to_string(), "HDMI 2".to_string()]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"["HDMI 1","HDMI 2"]"#);
    }

    #[test]
    fn should_deserialize_plain_string_as_string_variant() {
        let value: AttributeValue = serde_json::from_str("\"away\"").unwrap();
        assert_eq!(value, AttributeValue::String("away".to_string()));
    }
}
