//! Validation and filtering system
//!
//! This module provides a declarative approach to validating and normalizing
//! raw form submissions before any mutation touches storage.

pub mod extractor;
pub mod filters;
pub mod schema;
pub mod validators;

pub use extractor::FormFields;
pub use schema::{
    Coercion, FailureKind, FieldErrors, FieldFailure, FieldRule, FormInput, FormSchema,
    ValidFields, Validation,
};
