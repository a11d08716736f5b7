//! Field deserializers that never fail.
//!
//! Job entries come from container labels anyone with access to the runtime
//! can set. A wrong-shaped field must fall back to its default instead of
//! rejecting the whole entry, so every field goes through one of these.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, or `T::default()` if the value has the wrong shape.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A single string or a sequence of strings. Non-string elements are dropped.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(strings(value).collect())
}

/// Same as [`string_list`], collected into a set.
pub(crate) fn string_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(strings(value).collect())
}

/// A string, with empty strings and any other shape mapped to `None`.
pub(crate) fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// An object of string values. Non-string values are dropped per key.
pub(crate) fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => None,
        })
        .collect())
}

fn strings(value: Value) -> Box<dyn Iterator<Item = String>> {
    match value {
        Value::String(s) => Box::new(std::iter::once(s)),
        Value::Array(items) => Box::new(items.into_iter().filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })),
        _ => Box::new(std::iter::empty()),
    }
}
