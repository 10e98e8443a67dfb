//! Error types for result processing.
//!
//! Two families with very different lifetimes:
//! - `ResolutionError` is a configuration problem. It surfaces when the
//!   processor is selected and is always returned to the caller.
//! - `ProcessorError` is raised by variant code while handling one record.
//!   The entry point logs it and suppresses that record; it never escapes.

use thiserror::Error;

/// The configured processor reference could not be turned into a type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Reference is not of the form `<module.path>.<Name>`
    #[error("Malformed processor reference '{reference}': expected '<module.path>.<Name>'")]
    MalformedReference { reference: String },

    /// No processors were registered under the module path
    #[error("No module named '{module}' (resolving '{reference}')")]
    ModuleNotFound { module: String, reference: String },

    /// The module exists but holds no processor with that name
    #[error("Module '{module}' has no processor named '{name}'")]
    AttributeNotFound { module: String, name: String },
}

/// A variant failed while deciding on or decorating a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// A field the variant depends on is absent from the record
    #[error("Missing field: {field}")]
    MissingField { field: String },

    /// A field is present but holds the wrong kind of value
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// `compute_property` was asked for a name the variant does not declare
    #[error("Unknown property: {name}")]
    UnknownProperty { name: String },

    /// A computed property failed for a variant-specific reason
    #[error("Property {name} failed: {reason}")]
    Property { name: String, reason: String },

    /// The visibility predicate could not reach a decision
    #[error("Visibility check failed: {0}")]
    Visibility(String),
}

impl ProcessorError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for variant code
pub type Result<T> = std::result::Result<T, ProcessorError>;
