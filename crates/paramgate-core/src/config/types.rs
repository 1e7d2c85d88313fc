//! Configuration structure definitions

use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, FieldKind, FieldSpec, RawValue, UnpermittedPolicy};

/// Root configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Policy for schemas that do not set their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpermitted: Option<UnpermittedPolicy>,

    /// Schema declarations, in file order
    #[serde(default)]
    pub schemas: Vec<SchemaDef>,
}

/// One `[[schemas]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpermitted: Option<UnpermittedPolicy>,

    #[serde(default)]
    pub fields: Vec<FieldDef>,

    #[serde(default)]
    pub nested: Vec<NestedDef>,
}

/// One `[[schemas.fields]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    /// Raw default, coerced to `kind` when the schema is resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<RawValue>,

    #[serde(default)]
    pub blank_is_absent: bool,

    #[serde(default)]
    pub trim: bool,
}

/// One `[[schemas.nested]]` table: apply schema `schema` under `prefix[...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestedDef {
    pub prefix: String,
    pub schema: String,
}

impl FieldDef {
    /// Validate into a [`FieldSpec`].
    ///
    /// # Errors
    ///
    /// Returns the `ConfigurationError` [`FieldSpec`] construction raises.
    pub fn to_spec(&self) -> Result<FieldSpec, ConfigurationError> {
        let builder = FieldSpec::builder(self.name.clone(), self.kind.clone());
        let builder = if self.required { builder.required() } else { builder };
        let builder = match &self.default {
            Some(default) => builder.default(default.clone()),
            None => builder,
        };
        let builder = if self.blank_is_absent {
            builder.blank_is_absent()
        } else {
            builder
        };
        let builder = if self.trim { builder.trim() } else { builder };
        builder.build()
    }
}
