//! Validated request models
//!
//! A [`RequestModel`] only exists once every declared field has passed
//! validation; there is no partially built model to read from. Equality is
//! structural over the field map (and nested models).

use im::OrdMap;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{validation::nest_path, AccessError, RawInput, Value};

/// Immutable mapping from field name to validated value.
///
/// Holds exactly the present fields: required ones always, optional ones
/// only when supplied or defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestModel {
    fields: OrdMap<String, Value>,
    nested: OrdMap<String, RequestModel>,
}

impl RequestModel {
    pub(crate) fn new(
        fields: OrdMap<String, Value>,
        nested: OrdMap<String, Self>,
    ) -> Self {
        Self { fields, nested }
    }

    /// Value of a present field.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::FieldNotPresent` for optional fields that were
    /// neither supplied nor defaulted.
    pub fn get(&self, name: &str) -> Result<&Value, AccessError> {
        self.fields
            .get(name)
            .ok_or_else(|| AccessError::FieldNotPresent(name.to_string()))
    }

    /// Text of a string field
    pub fn string(&self, name: &str) -> Result<&str, AccessError> {
        match self.get(name)? {
            Value::String(text) => Ok(text),
            other => Err(mismatch(name, "string", other)),
        }
    }

    /// Number held by an integer field
    pub fn integer(&self, name: &str) -> Result<i64, AccessError> {
        match self.get(name)? {
            Value::Integer(number) => Ok(*number),
            other => Err(mismatch(name, "integer", other)),
        }
    }

    /// Flag held by a boolean field
    pub fn boolean(&self, name: &str) -> Result<bool, AccessError> {
        match self.get(name)? {
            Value::Boolean(flag) => Ok(*flag),
            other => Err(mismatch(name, "boolean", other)),
        }
    }

    /// Declared value held by an enum field
    pub fn enumeration(&self, name: &str) -> Result<&str, AccessError> {
        match self.get(name)? {
            Value::Enum(text) => Ok(text),
            other => Err(mismatch(name, "enum", other)),
        }
    }

    /// Model built from the keys under `prefix[...]`
    pub fn nested(&self, prefix: &str) -> Result<&Self, AccessError> {
        self.nested
            .get(prefix)
            .ok_or_else(|| AccessError::FieldNotPresent(prefix.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of present fields (nested models not included)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Present fields, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Names of present fields, ordered
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Nested models, ordered by prefix
    pub fn nested_models(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.nested.iter().map(|(prefix, model)| (prefix.as_str(), model))
    }

    /// Re-serialize to the raw input shape.
    ///
    /// Building the result against the same schema yields an equal model.
    pub fn to_raw_input(&self) -> RawInput {
        let flat: RawInput = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_raw()))
            .collect();

        self.nested.iter().fold(flat, |input, (prefix, model)| {
            model.to_raw_input().iter().fold(input, |input, (key, value)| {
                input.with(nest_path(prefix, key), value.clone())
            })
        })
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> AccessError {
    AccessError::KindMismatch {
        field: field.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl Serialize for RequestModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.nested.len()))?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(name, value)?;
        }
        for (prefix, model) in self.nested.iter() {
            map.serialize_entry(prefix, model)?;
        }
        map.end()
    }
}

/// Treat an absent optional field as `None` instead of an error
pub trait AccessResultExt<T> {
    /// `FieldNotPresent` becomes `Ok(None)`; kind mismatches stay errors.
    fn optional(self) -> Result<Option<T>, AccessError>;
}

impl<T> AccessResultExt<T> for Result<T, AccessError> {
    fn optional(self) -> Result<Option<T>, AccessError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(AccessError::FieldNotPresent(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
