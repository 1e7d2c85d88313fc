//! Field declarations
//!
//! A [`FieldSpec`] names one permitted field and the constraints its raw value
//! must meet. It has no behavior of its own; [`crate::ModelBuilder`] applies it.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{builder::coerce, validation::Reason, ConfigurationError, RawValue, Value};

/// The type a field's raw value is coerced into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    /// Text restricted to the listed values
    Enum(Vec<String>),
}

impl FieldKind {
    /// Name of the kind, matching [`Value::type_name`]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Declaration of one permitted field.
///
/// Only constructible through [`FieldSpecBuilder::build`], so every instance
/// satisfies: a required field has no default, a default fits the kind, and
/// an enum lists at least one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    blank_is_absent: bool,
    trim: bool,
}

impl FieldSpec {
    /// Start declaring a field of any kind
    pub fn builder(name: impl Into<String>, kind: FieldKind) -> FieldSpecBuilder {
        FieldSpecBuilder::new(name, kind)
    }

    /// Start declaring a string field
    pub fn string(name: impl Into<String>) -> FieldSpecBuilder {
        FieldSpecBuilder::new(name, FieldKind::String)
    }

    /// Start declaring an integer field
    pub fn integer(name: impl Into<String>) -> FieldSpecBuilder {
        FieldSpecBuilder::new(name, FieldKind::Integer)
    }

    /// Start declaring a boolean field
    pub fn boolean(name: impl Into<String>) -> FieldSpecBuilder {
        FieldSpecBuilder::new(name, FieldKind::Boolean)
    }

    /// Start declaring an enum field
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> FieldSpecBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSpecBuilder::new(
            name,
            FieldKind::Enum(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub const fn is_required(&self) -> bool {
        self.required
    }

    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub const fn blank_is_absent(&self) -> bool {
        self.blank_is_absent
    }

    pub const fn trims(&self) -> bool {
        self.trim
    }
}

/// Builder for [`FieldSpec`]
#[derive(Debug, Clone)]
pub struct FieldSpecBuilder {
    name: String,
    kind: FieldKind,
    required: bool,
    default: Option<RawValue>,
    blank_is_absent: bool,
    trim: bool,
}

impl FieldSpecBuilder {
    /// Create a builder for an optional field with no normalization
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            blank_is_absent: false,
            trim: false,
        }
    }

    /// Mark this field as required
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value, given in raw form and coerced at build time
    pub fn default(mut self, default: impl Into<RawValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Treat the empty string like an absent key
    pub const fn blank_is_absent(mut self) -> Self {
        self.blank_is_absent = true;
        self
    }

    /// Strip surrounding whitespace from text before any other rule
    pub const fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Build the [`FieldSpec`]
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the name is empty, an enum has no
    /// values, a required field declares a default, or the default does not
    /// coerce to the field's kind.
    pub fn build(self) -> Result<FieldSpec, ConfigurationError> {
        if self.name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if matches!(&self.kind, FieldKind::Enum(values) if values.is_empty()) {
            return Err(ConfigurationError::EmptyEnum { field: self.name });
        }
        if self.required && self.default.is_some() {
            return Err(ConfigurationError::RequiredWithDefault { field: self.name });
        }

        let default = self
            .default
            .as_ref()
            .map(|raw| coerce(&self.kind, raw).map_err(|reason| self.default_error(reason)))
            .transpose()?;

        Ok(FieldSpec {
            name: self.name,
            kind: self.kind,
            required: self.required,
            default,
            blank_is_absent: self.blank_is_absent,
            trim: self.trim,
        })
    }

    fn default_error(&self, reason: Reason) -> ConfigurationError {
        match (&self.kind, reason) {
            (FieldKind::Enum(values), Reason::NotInEnum) => ConfigurationError::DefaultNotInEnum {
                field: self.name.clone(),
                values: values.clone(),
            },
            (kind, _) => ConfigurationError::DefaultKindMismatch {
                field: self.name.clone(),
                expected: kind.name(),
            },
        }
    }
}
