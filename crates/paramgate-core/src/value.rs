//! Raw and typed values
//!
//! - [`RawValue`] / [`RawInput`]: untyped data as delivered by an HTTP layer
//! - [`Value`]: a value that passed coercion for its field kind
//!
//! Nested parameters use the bracket notation HTML forms produce
//! (`publisher[name]=Pragmatic`). JSON documents are flattened into the same
//! shape so a single lookup scheme serves both sources.

use std::borrow::Cow;

use im::OrdMap;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// RAW VALUES
// ═══════════════════════════════════════════════════════════════════════════

/// An untyped input value.
///
/// `Null` is accepted so JSON documents deserialize as-is; the builder treats
/// it exactly like an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(untagged)]
#[strum(serialize_all = "snake_case")]
pub enum RawValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Whether this value stands for "not supplied"
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is the empty string
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.into()
    }

    /// Text with surrounding whitespace removed; other values unchanged
    pub fn trimmed(&self) -> Cow<'_, Self> {
        match self {
            Self::Text(text) if text.trim().len() != text.len() => {
                Cow::Owned(Self::Text(text.trim().to_string()))
            }
            _ => Cow::Borrowed(self),
        }
    }

    fn from_json_scalar(key: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(flag) => Ok(Self::Boolean(*flag)),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Float))
                .ok_or_else(|| Error::parse_error(format!("unsupported number for '{key}'"))),
            serde_json::Value::String(text) => Ok(Self::Text(text.clone())),
            serde_json::Value::Array(_) => Err(Error::parse_error(format!(
                "arrays are not supported as parameter values (key '{key}')"
            ))),
            serde_json::Value::Object(_) => Err(Error::parse_error(format!(
                "unexpected object for '{key}'"
            ))),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RAW INPUT
// ═══════════════════════════════════════════════════════════════════════════

/// Untyped key/value input at the system boundary.
///
/// Backed by a persistent ordered map: insertion returns a new input and
/// iteration is always in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput(OrdMap<String, RawValue>);

impl RawInput {
    /// Create an empty input
    #[must_use]
    pub fn new() -> Self {
        Self(OrdMap::new())
    }

    /// Return a new input with `key` set to `value`
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        Self(self.0.update(key.into(), value.into()))
    }

    /// Look up a raw value by key
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Combine two inputs; keys in `other` win.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        other
            .iter()
            .fold(self.clone(), |merged, (key, value)| merged.with(key, value.clone()))
    }

    /// Entries under `prefix[...]`, with the prefix removed.
    ///
    /// `publisher[name]` becomes `name` and `publisher[address][city]`
    /// becomes `address[city]`. Keys without a closing bracket or with an
    /// empty inner key are skipped.
    #[must_use]
    pub fn scoped(&self, prefix: &str) -> Self {
        self.iter()
            .filter_map(|(key, value)| {
                scoped_key(key, prefix).map(|inner| (inner, value.clone()))
            })
            .collect()
    }

    /// Whether any key lives under `prefix[...]`
    pub fn has_scope(&self, prefix: &str) -> bool {
        self.keys().any(|key| scoped_key(key, prefix).is_some())
    }

    /// Parse a JSON object into raw input.
    ///
    /// Nested objects are flattened into bracket keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the document is not an object, or holds
    /// arrays.
    pub fn from_json_str(document: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(document)?;
        Self::from_json(&value)
    }

    /// Convert a parsed JSON object into raw input.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the value is not an object, or holds arrays.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => flatten_object(Self::new(), None, map),
            other => Err(Error::parse_error(format!(
                "raw input must be a JSON object, found {}",
                json_type_name(other)
            ))),
        }
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. Repeated keys keep the last value.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .fold(Self::new(), |input, (key, value)| {
                input.with(key.into_owned(), value.into_owned())
            })
    }
}

impl<K, V> FromIterator<(K, V)> for RawInput
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

pub(crate) fn scoped_key(key: &str, prefix: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?.strip_prefix('[')?;
    let close = rest.find(']')?;
    let (inner, remainder) = (&rest[..close], &rest[close + 1..]);
    if inner.is_empty() {
        None
    } else {
        Some(format!("{inner}{remainder}"))
    }
}

fn flatten_object(
    input: RawInput,
    parent: Option<&str>,
    map: &serde_json::Map<String, serde_json::Value>,
) -> Result<RawInput> {
    map.iter().try_fold(input, |input, (key, value)| {
        let path = parent.map_or_else(|| key.clone(), |parent| format!("{parent}[{key}]"));
        match value {
            serde_json::Value::Object(inner) => flatten_object(input, Some(&path), inner),
            scalar => RawValue::from_json_scalar(&path, scalar).map(|raw| input.with(path, raw)),
        }
    })
}

const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPED VALUES
// ═══════════════════════════════════════════════════════════════════════════

/// A value that passed coercion for its field kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
#[serde(untagged)]
#[strum(serialize_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    /// One of the declared values of an enum field
    Enum(String),
}

impl Value {
    /// Name of the kind this value belongs to
    pub fn type_name(&self) -> &'static str {
        self.into()
    }

    /// The raw shape this value would arrive in
    pub fn to_raw(&self) -> RawValue {
        match self {
            Self::String(text) | Self::Enum(text) => RawValue::Text(text.clone()),
            Self::Integer(number) => RawValue::Integer(*number),
            Self::Boolean(flag) => RawValue::Boolean(*flag),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(text) | Self::Enum(text) => write!(f, "{text}"),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Boolean(flag) => write!(f, "{flag}"),
        }
    }
}
