//! Error types for paramgate-core, with categorization:
//!
//! - **Configuration errors**: schemas that can never validate correctly (exit code 2)
//! - **Access errors**: reading a field a model does not carry (exit code 3)
//! - **IO / parse errors**: schema files and raw input documents (exit code 2)
//! - **Service errors**: failures raised behind a service boundary (exit code 3)
//!
//! Rejected requests are not errors here. They are returned as
//! [`crate::ValidationErrors`] and the CLI reserves exit code 1 for them.

use thiserror::Error;

/// A schema declaration that can never be satisfied or is ambiguous.
///
/// These are raised while declaring fields and schemas (startup time), never
/// while building a request model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required field also declares a default
    #[error("field '{field}' is required and cannot declare a default")]
    RequiredWithDefault { field: String },

    /// A default that does not coerce to the field's kind
    #[error("default for field '{field}' is not a valid {expected}")]
    DefaultKindMismatch {
        field: String,
        expected: &'static str,
    },

    /// An enum default outside the declared values
    #[error("default for field '{field}' is not one of {values:?}")]
    DefaultNotInEnum { field: String, values: Vec<String> },

    /// Field names must be non-empty
    #[error("field name cannot be empty")]
    EmptyName,

    /// Enum fields must declare at least one value
    #[error("enum field '{field}' must declare at least one value")]
    EmptyEnum { field: String },

    /// Field names are unique within a schema
    #[error("field '{field}' is declared more than once in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// A nested prefix collides with a field or another prefix
    #[error("nested prefix '{prefix}' is declared more than once in schema '{schema}'")]
    DuplicateNested { schema: String, prefix: String },

    /// Schema names are unique within a registry
    #[error("schema '{0}' is declared more than once")]
    DuplicateSchema(String),

    /// Lookup of a schema that was never declared
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Schemas nesting each other
    #[error("schema '{0}' nests itself")]
    NestingCycle(String),

    /// A setting outside its allowed values
    #[error("invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },
}

/// Reading a request model field that cannot satisfy the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Optional field that was neither supplied nor defaulted
    #[error("field '{0}' is not present")]
    FieldNotPresent(String),

    /// Field exists but holds another kind of value
    #[error("field '{field}' holds a {found} value, not {expected}")]
    KindMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Top-level error type for paramgate operations
#[derive(Debug, Error)]
pub enum Error {
    /// Schema declaration or settings problem
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Model field access problem
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Filesystem failures
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed TOML, JSON or query input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure raised by a service behind a boundary
    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Create an IO error.
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a service error.
    pub fn service_error(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Stable machine-readable code for JSON output
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Access(_) => "ACCESS_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Service(_) => "SERVICE_ERROR",
        }
    }

    /// Returns the process exit code for this error.
    ///
    /// - 2: configuration, IO and parse problems
    /// - 3: access and service failures
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Io(_) | Self::Parse(_) => 2,
            Self::Access(_) | Self::Service(_) => 3,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::parse_error(format!("Failed to parse config: {err}"))
    }
}

/// Result type alias for paramgate-core operations
pub type Result<T> = std::result::Result<T, Error>;
