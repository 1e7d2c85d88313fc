//! Service boundaries
//!
//! A service never sees raw input. It declares the [`ModelSchema`] it reads
//! and accepts exactly one [`RequestModel`] built against it.

use thiserror::Error;
use tracing::debug;

use crate::{AccessError, Error, ModelSchema, RawInput, RequestModel, Result, ValidationErrors};

/// Contract for operations that accept a validated request model
pub trait ServiceBoundary {
    /// What the operation produces
    type Output;

    /// Schema every request to this service is built against
    fn schema(&self) -> &ModelSchema;

    /// Run the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the service itself fails. Input problems never
    /// reach this point.
    fn serve(&self, request: &RequestModel) -> Result<Self::Output>;
}

/// Why a raw request did not produce an output
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The input failed validation; the service was not called
    #[error("request rejected: {0}")]
    Rejected(ValidationErrors),

    /// The service was called and failed
    #[error(transparent)]
    Service(#[from] Error),
}

impl BoundaryError {
    /// Validation errors, if the request was rejected before the service ran
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::Service(_) => None,
        }
    }
}

impl From<ValidationErrors> for BoundaryError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Rejected(errors)
    }
}

/// Build `raw` against the service's schema, then serve it.
///
/// # Errors
///
/// Returns `BoundaryError::Rejected` with every violation when the input does
/// not validate, or `BoundaryError::Service` when the service fails.
pub fn serve_raw<S>(service: &S, raw: &RawInput) -> std::result::Result<S::Output, BoundaryError>
where
    S: ServiceBoundary + ?Sized,
{
    let schema = service.schema();
    let request = schema.build(raw)?;
    debug!(schema = schema.name(), fields = request.len(), "serving request");
    Ok(service.serve(&request)?)
}

/// Typed extraction of a service's own request struct from a model
pub trait FromModel: Sized {
    /// # Errors
    ///
    /// Returns an `AccessError` when the model lacks a field the struct needs
    /// or holds it as another kind.
    fn from_model(model: &RequestModel) -> std::result::Result<Self, AccessError>;
}
