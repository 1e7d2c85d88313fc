//! Named schemas available to the CLI and to services

use im::OrdMap;

use crate::{
    catalog::{book_search_schema, publisher_search_schema},
    ConfigurationError, ModelSchema,
};

/// Schemas keyed by name, ordered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    schemas: OrdMap<String, ModelSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the book search schemas.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a built-in schema cannot be declared.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::new()
            .register(book_search_schema()?)?
            .register(publisher_search_schema()?)
    }

    /// Add a schema under its own name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateSchema` if the name is taken.
    pub fn register(&self, schema: ModelSchema) -> Result<Self, ConfigurationError> {
        if self.schemas.contains_key(schema.name()) {
            return Err(ConfigurationError::DuplicateSchema(schema.name().to_string()));
        }
        Ok(self.replace(schema))
    }

    /// Add a schema, replacing any schema of the same name
    #[must_use]
    pub fn replace(&self, schema: ModelSchema) -> Self {
        Self {
            schemas: self.schemas.update(schema.name().to_string(), schema),
        }
    }

    /// Schema by name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownSchema` if no schema has this name.
    pub fn get(&self, name: &str) -> Result<&ModelSchema, ConfigurationError> {
        self.schemas
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownSchema(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Layer `other` on top; its schemas win on name clashes
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        other.iter().cloned().fold(self.clone(), |registry, schema| registry.replace(schema))
    }
}
