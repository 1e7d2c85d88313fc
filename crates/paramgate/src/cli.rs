//! Command-line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use paramgate_core::UnpermittedPolicy;

#[derive(Debug, Parser)]
#[command(name = "paramgate", version)]
#[command(about = "Validate raw request parameters against declared request models")]
pub struct Cli {
    /// Config file to use instead of .paramgate/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Default policy for undeclared keys (ignore, log, reject)
    #[arg(long, global = true, value_name = "POLICY")]
    pub unpermitted: Option<UnpermittedPolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List available schemas
    Schemas,
    /// Print a schema as JSON Schema
    Describe {
        /// Schema name
        schema: String,
    },
    /// Build a request model from raw input and print it
    Check {
        /// Schema name
        schema: String,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Search the built-in book catalog
    Search {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Raw input sources, applied in order: file, query, params
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// JSON object file, or `-` for stdin
    #[arg(long, short, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// URL-encoded query string
    #[arg(long, short, value_name = "QUERY")]
    pub query: Option<String>,

    /// Single `key=value` parameter (repeatable)
    #[arg(long = "param", short, value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}
