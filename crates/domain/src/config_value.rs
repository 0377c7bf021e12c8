//! Deserialization of user-supplied config entry data into typed settings.
//!
//! Settings arrive as loosely typed JSON (converted from TOML or an
//! interactive flow). Integrations derive [`Deserialize`] on a raw struct
//! whose fields use the `deserialize_with` helpers below, then check
//! presence and ranges with [`required`], [`non_empty`] and [`port`].
//! The same rules apply to every integration:
//! - `null` counts as absent
//! - text is kept exactly as given; blank text counts as empty
//! - numbers and booleans are accepted where text is expected
//! - numeric fields accept numbers and numeric strings

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

use crate::error::ValidationError;

/// Deserialize entry data into `T`.
///
/// # Errors
///
/// Returns [`ValidationError::NotAnObject`] if `data` is not a JSON object
/// and [`ValidationError::InvalidData`] if a field has the wrong shape.
pub fn from_data<T: DeserializeOwned>(data: &Value) -> Result<T, ValidationError> {
    if !data.is_object() {
        return Err(ValidationError::NotAnObject);
    }
    T::deserialize(data).map_err(|err| ValidationError::InvalidData(err.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

/// Optional text; numbers and booleans are rendered as text.
///
/// # Errors
///
/// Fails for arrays and objects.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
            Scalar::Text(text) => text,
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }),
    )
}

/// Optional finite float; numeric strings are parsed.
///
/// # Errors
///
/// Fails for values that are not numbers, or not finite.
pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let number = match Option::<Scalar>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Scalar::Number(n)) => n.as_f64(),
        Some(Scalar::Text(text)) => text.trim().parse::<f64>().ok(),
        Some(Scalar::Bool(_)) => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(D::Error::custom("expected a finite number")),
    }
}

/// Optional non-negative integer; numeric strings are parsed.
///
/// # Errors
///
/// Fails for values that are not non-negative integers.
pub fn unsigned<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let number = match Option::<Scalar>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Scalar::Number(n)) => n.as_u64(),
        Some(Scalar::Text(text)) => text.trim().parse::<u64>().ok(),
        Some(Scalar::Bool(_)) => None,
    };
    number
        .map(Some)
        .ok_or_else(|| D::Error::custom("expected a non-negative integer"))
}

/// Reject blank text, keeping the value untouched otherwise.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyField`] when the text is blank.
pub fn non_empty(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(text) if text.trim().is_empty() => Err(ValidationError::EmptyField(field)),
        other => Ok(other),
    }
}

/// Require present, non-blank text.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] when absent and
/// [`ValidationError::EmptyField`] when blank.
pub fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    non_empty(field, value)?.ok_or(ValidationError::MissingField(field))
}

/// Require a TCP port in `1..=65535`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] when absent and
/// [`ValidationError::InvalidField`] when out of range.
pub fn port(field: &'static str, value: Option<u64>) -> Result<u16, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    match u16::try_from(value) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a port between 1 and 65535, got {value}"),
        }),
    }
}
