//! # Paramgate Core
//!
//! Explicit request models for service boundaries.
//!
//! Raw, untyped input (HTTP query or body parameters) never reaches a service
//! directly. It is checked against a declared [`ModelSchema`] and either
//! becomes an immutable, typed [`RequestModel`] or is rejected with the full
//! list of [`ValidationErrors`].
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! Two kinds of failure exist and they never mix:
//! - Request-time validation failures are data ([`ValidationErrors`])
//! - Broken schemas are [`ConfigurationError`]s, raised while declaring them
//!
//! ## Example
//!
//! ```rust
//! use paramgate_core::{FieldSpec, ModelSchema, RawInput};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = ModelSchema::new(
//!     "book_search",
//!     [
//!         FieldSpec::string("term").blank_is_absent().build()?,
//!         FieldSpec::enumeration("format", ["paper", "hard", "ebook"]).build()?,
//!     ],
//! )?;
//!
//! let raw: RawInput = [("term", "ruby"), ("format", "ebook")].into_iter().collect();
//! let model = schema.build(&raw)?;
//! assert_eq!(model.string("term")?, "ruby");
//! assert_eq!(model.enumeration("format")?, "ebook");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod builder;
pub mod catalog;
pub mod config;
mod error;
pub mod field;
pub mod model;
pub mod registry;
pub mod schema;
pub mod validation;
pub mod value;

pub use boundary::{serve_raw, BoundaryError, FromModel, ServiceBoundary};
pub use builder::ModelBuilder;
pub use error::{AccessError, ConfigurationError, Error, Result};
pub use field::{FieldKind, FieldSpec, FieldSpecBuilder};
pub use model::{AccessResultExt, RequestModel};
pub use registry::SchemaRegistry;
pub use schema::{ModelSchema, UnpermittedPolicy};
pub use validation::{Reason, ValidationError, ValidationErrors};
pub use value::{RawInput, RawValue, Value};
