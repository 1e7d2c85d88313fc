//! Configuration merging logic (Immutable functional pattern)
//!
//! Later configs override earlier ones (defaults → global → project → env → CLI).

use std::collections::HashSet;

use super::types::Config;
use crate::UnpermittedPolicy;

impl Config {
    /// Merge another config into this one (other takes precedence).
    ///
    /// Schemas are replaced whole by name, never merged field by field.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let overridden: HashSet<&str> = other.schemas.iter().map(|s| s.name.as_str()).collect();
        let schemas = self
            .schemas
            .into_iter()
            .filter(|schema| !overridden.contains(schema.name.as_str()))
            .chain(other.schemas.iter().cloned())
            .collect();

        Self {
            unpermitted: other.unpermitted.or(self.unpermitted),
            schemas,
        }
    }

    /// Override the default unpermitted policy (CLI flag layer)
    #[must_use]
    pub fn with_unpermitted(self, policy: Option<UnpermittedPolicy>) -> Self {
        Self {
            unpermitted: policy.or(self.unpermitted),
            ..self
        }
    }

    /// Effective default policy
    pub fn default_policy(&self) -> UnpermittedPolicy {
        self.unpermitted.unwrap_or_default()
    }
}
