//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults (the book search schemas, `ignore` policy)
//! 2. Global config: `<config dir>/paramgate/config.toml`
//! 3. Project config: `.paramgate/config.toml`, or the file named by
//!    `--config` / `PARAMGATE_CONFIG`
//! 4. Environment variables: `PARAMGATE_*`
//! 5. CLI flags (command-specific)
//!
//! # Example Config
//!
//! ```toml
//! unpermitted = "log"
//!
//! [[schemas]]
//! name = "author_lookup"
//! unpermitted = "reject"
//!
//! [[schemas.fields]]
//! name = "surname"
//! kind = "string"
//! required = true
//! trim = true
//!
//! [[schemas.fields]]
//! name = "format"
//! kind = { enum = ["paper", "hard", "ebook"] }
//! default = "paper"
//!
//! [[schemas.nested]]
//! prefix = "publisher"
//! schema = "publisher_search"
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `load`: Loading from files and environment
//! - `merge`: Configuration merging logic
//! - `resolve`: Turning schema definitions into a [`crate::SchemaRegistry`]

mod load;
mod merge;
mod resolve;
mod types;

#[cfg(test)]
mod tests_loading;

pub use load::{
    global_config_path, load_config, load_toml_file, project_config_path, ConfigSources,
    CONFIG_ENV, UNPERMITTED_ENV,
};
pub use types::{Config, FieldDef, NestedDef, SchemaDef};
