//! Value coercion
//!
//! Converts raw request values into typed [`Value`]s for a target
//! [`PropertyType`]. Failures are reported as [`CoercionError`] so callers
//! can degrade to a weaker typing instead of failing the request.

mod date;

pub use date::DateParser;

use std::fmt;
use std::str::FromStr;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;
use crate::core::{PropertyType, Value, ValueEntry};

/// A raw value that cannot be read as the requested type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub target: PropertyType,
    pub raw: String,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read '{}' as {}", self.raw, self.target)
    }
}

impl std::error::Error for CoercionError {}

/// Converts one raw value to `target`
pub fn coerce(
    entry: &ValueEntry,
    target: PropertyType,
    dates: &DateParser,
) -> Result<Value, CoercionError> {
    if let (PropertyType::Binary, ValueEntry::Binary { data, .. }) = (target, entry) {
        return Ok(Value::Binary(data.clone()));
    }

    let raw = entry.as_string();
    let fail = || CoercionError { target, raw: raw.to_string() };

    let value = match target {
        PropertyType::String | PropertyType::Undefined => Value::String(raw.to_string()),
        PropertyType::Binary => Value::Binary(raw.as_bytes().to_vec()),
        PropertyType::Long => Value::Long(raw.trim().parse().map_err(|_| fail())?),
        PropertyType::Double => Value::Double(raw.trim().parse().map_err(|_| fail())?),
        PropertyType::Decimal => {
            Value::Decimal(Decimal::from_str(raw.trim()).map_err(|_| fail())?)
        }
        PropertyType::Date => Value::Date(dates.parse(&raw).ok_or_else(fail)?),
        PropertyType::Boolean => Value::Boolean(raw.trim().eq_ignore_ascii_case("true")),
        PropertyType::Name => {
            if raw.is_empty() || raw.contains('/') {
                return Err(fail());
            }
            Value::Name(raw.to_string())
        }
        PropertyType::Path => {
            if raw.is_empty() {
                return Err(fail());
            }
            Value::Path(raw.to_string())
        }
        PropertyType::Reference => {
            Value::Reference(Uuid::parse_str(raw.trim()).map_err(|_| fail())?)
        }
        PropertyType::WeakReference => {
            Value::WeakReference(Uuid::parse_str(raw.trim()).map_err(|_| fail())?)
        }
        PropertyType::Uri => {
            if raw.is_empty() || raw.chars().any(char::is_whitespace) {
                return Err(fail());
            }
            Value::Uri(raw.to_string())
        }
    };

    Ok(value)
}

/// Converts to `target`, degrading to a plain string when that fails
pub fn coerce_or_string(entry: &ValueEntry, target: PropertyType, dates: &DateParser) -> Value {
    coerce(entry, target, dates).unwrap_or_else(|err| {
        debug!("Degrading to String: {}", err);
        Value::String(entry.as_string().into_owned())
    })
}

/// Converts every entry to `target`; each entry degrades independently
pub fn coerce_all(entries: &[ValueEntry], target: PropertyType, dates: &DateParser) -> Vec<Value> {
    entries
        .iter()
        .map(|entry| coerce_or_string(entry, target, dates))
        .collect()
}
