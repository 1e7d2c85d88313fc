//! Model schemas
//!
//! A [`ModelSchema`] is the ordered, validated set of [`FieldSpec`]s one
//! request model is built from, plus:
//! - the policy for keys the schema does not declare
//! - nested schemas applied to bracket-scoped keys (`publisher[name]`)

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};

use crate::{
    value::scoped_key, ConfigurationError, FieldKind, FieldSpec, ModelBuilder, RawInput,
    RequestModel, ValidationErrors,
};

/// What happens to raw keys the schema does not declare
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UnpermittedPolicy {
    /// Drop silently (debug log only)
    #[default]
    Ignore,
    /// Drop and log a warning per key
    Log,
    /// Report each key as an `unpermitted` validation error
    Reject,
}

/// A schema applied to the keys under `prefix[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedSchema {
    prefix: String,
    schema: ModelSchema,
}

impl NestedSchema {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub const fn schema(&self) -> &ModelSchema {
        &self.schema
    }
}

/// Ordered field declarations for one request model.
///
/// Field names are unique; nested prefixes are unique and never shadow a
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<FieldSpec>,
    nested: Vec<NestedSchema>,
    unpermitted: UnpermittedPolicy,
}

impl ModelSchema {
    /// Create a schema from fields in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateField` if two fields share a name.
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let fields: Vec<FieldSpec> = fields.into_iter().collect();

        if let Some(duplicate) = fields.iter().map(FieldSpec::name).duplicates().next() {
            return Err(ConfigurationError::DuplicateField {
                field: duplicate.to_string(),
                schema: name,
            });
        }

        Ok(Self {
            name,
            fields,
            nested: Vec::new(),
            unpermitted: UnpermittedPolicy::default(),
        })
    }

    /// Set the unpermitted-key policy
    pub const fn with_unpermitted(mut self, policy: UnpermittedPolicy) -> Self {
        self.unpermitted = policy;
        self
    }

    /// Set the unpermitted-key policy here and in every nested schema
    #[must_use]
    pub fn with_unpermitted_deep(self, policy: UnpermittedPolicy) -> Self {
        Self {
            unpermitted: policy,
            nested: self
                .nested
                .into_iter()
                .map(|nested| NestedSchema {
                    prefix: nested.prefix,
                    schema: nested.schema.with_unpermitted_deep(policy),
                })
                .collect(),
            ..self
        }
    }

    /// Apply `schema` to the keys under `prefix[...]`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the prefix is empty, names a field,
    /// or is already nested.
    pub fn with_nested(
        mut self,
        prefix: impl Into<String>,
        schema: Self,
    ) -> Result<Self, ConfigurationError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if self.field(&prefix).is_some() || self.nested_schema(&prefix).is_some() {
            return Err(ConfigurationError::DuplicateNested {
                schema: self.name,
                prefix,
            });
        }
        self.nested.push(NestedSchema { prefix, schema });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn nested(&self) -> &[NestedSchema] {
        &self.nested
    }

    pub const fn unpermitted(&self) -> UnpermittedPolicy {
        self.unpermitted
    }

    /// Field declaration by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Nested schema by prefix
    pub fn nested_schema(&self, prefix: &str) -> Option<&Self> {
        self.nested
            .iter()
            .find(|nested| nested.prefix == prefix)
            .map(|nested| &nested.schema)
    }

    /// Whether a raw key is declared, directly or under a nested prefix.
    ///
    /// Bracket keys only count when they scope a non-empty inner key, so
    /// `publisher[]` and `publisher[name` are unpermitted.
    pub fn permits(&self, key: &str) -> bool {
        self.field(key).is_some()
            || self
                .nested
                .iter()
                .any(|nested| scoped_key(key, &nested.prefix).is_some())
    }

    /// Build a request model from raw input.
    ///
    /// # Errors
    ///
    /// Returns every violation found; see [`ModelBuilder::build`].
    pub fn build(&self, raw: &RawInput) -> Result<RequestModel, ValidationErrors> {
        ModelBuilder::build(raw, self)
    }

    /// Render as a JSON Schema object
    pub fn to_json_schema(&self) -> serde_json::Value {
        let (properties, required): (serde_json::Map<String, serde_json::Value>, Vec<String>) =
            self.fields.iter().fold(
                (serde_json::Map::new(), Vec::new()),
                |(mut props, mut req), field| {
                    props.insert(field.name().to_string(), field.to_json_schema());
                    if field.is_required() {
                        req.push(field.name().to_string());
                    }
                    (props, req)
                },
            );

        let properties = self.nested.iter().fold(properties, |mut props, nested| {
            props.insert(nested.prefix.clone(), nested.schema.to_json_schema());
            props
        });

        let mut schema = json!({
            "type": "object",
            "title": self.name,
            "additionalProperties": self.unpermitted != UnpermittedPolicy::Reject,
        });

        if !properties.is_empty() {
            schema["properties"] = serde_json::Value::Object(properties);
        }

        if !required.is_empty() {
            schema["required"] = json!(required);
        }

        schema
    }
}

impl FieldSpec {
    /// Render as a JSON Schema property
    pub fn to_json_schema(&self) -> serde_json::Value {
        let mut schema = match self.kind() {
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Integer => json!({ "type": "integer" }),
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
        };

        if let Some(default) = self.default() {
            schema["default"] = json!(default);
        }

        if self.blank_is_absent() {
            schema["x-blank-is-absent"] = json!(true);
        }

        schema
    }
}
