//! Turning schema definitions into validated schemas
//!
//! Every definition becomes a [`ModelSchema`]; the first
//! [`ConfigurationError`] aborts resolution. Nested references are resolved
//! by name against the configured schemas first, then the built-ins.
//!
//! Policy: a schema without its own `unpermitted` takes the policy of the
//! schema it is nested in, and top-level schemas take the configured default.
//! Built-ins never declare one, so the default reaches all of their scopes.

use itertools::Itertools;
use tracing::debug;

use super::types::{Config, SchemaDef};
use crate::{ConfigurationError, ModelSchema, SchemaRegistry, UnpermittedPolicy};

impl Config {
    /// Build the registry: built-in schemas, then configured ones on top.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for duplicate schema names, unknown or
    /// cyclic nested references, and any invalid field declaration.
    pub fn registry(&self) -> Result<SchemaRegistry, ConfigurationError> {
        if let Some(duplicate) = self.schemas.iter().map(|s| s.name.as_str()).duplicates().next() {
            return Err(ConfigurationError::DuplicateSchema(duplicate.to_string()));
        }

        let policy = self.default_policy();
        let builtin = SchemaRegistry::builtin()?;
        let base = builtin
            .iter()
            .fold(SchemaRegistry::new(), |registry, schema| {
                registry.replace(schema.clone().with_unpermitted_deep(policy))
            });

        let registry = self.schemas.iter().try_fold(base, |registry, def| {
            let schema = self.resolve(def, policy, &builtin, &mut Vec::new())?;
            Ok::<_, ConfigurationError>(registry.replace(schema))
        })?;

        debug!(
            schemas = registry.len(),
            configured = self.schemas.len(),
            policy = %policy,
            "resolved schema registry"
        );
        Ok(registry)
    }

    /// Validate every schema definition without keeping the result
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.registry().map(|_| ())
    }

    fn resolve(
        &self,
        def: &SchemaDef,
        inherited: UnpermittedPolicy,
        builtin: &SchemaRegistry,
        stack: &mut Vec<String>,
    ) -> Result<ModelSchema, ConfigurationError> {
        if stack.contains(&def.name) {
            return Err(ConfigurationError::NestingCycle(def.name.clone()));
        }
        if def.name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        stack.push(def.name.clone());

        let fields = def
            .fields
            .iter()
            .map(super::FieldDef::to_spec)
            .collect::<Result<Vec<_>, _>>()?;
        let policy = def.unpermitted.unwrap_or(inherited);
        let schema = ModelSchema::new(def.name.clone(), fields)?.with_unpermitted(policy);

        let schema = def.nested.iter().try_fold(schema, |schema, nested| {
            let inner = match self.schemas.iter().find(|s| s.name == nested.schema) {
                Some(inner_def) => self.resolve(inner_def, policy, builtin, stack)?,
                None => builtin.get(&nested.schema)?.clone().with_unpermitted_deep(policy),
            };
            schema.with_nested(nested.prefix.clone(), inner)
        })?;

        stack.pop();
        Ok(schema)
    }
}
