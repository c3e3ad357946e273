//! Control-flow result of a form mutation
//!
//! A successful mutation ends in a redirect. Rather than performing the
//! navigation, the service returns [`Outcome::Redirect`] and lets the caller
//! (an HTTP handler, a test) decide how to exit.

use crate::core::validation::FieldErrors;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// What the form should do after a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Field validation failed; nothing was written
    Invalid { message: String, errors: FieldErrors },

    /// Storage rejected the write; the backend error is logged, not returned
    Failed { message: String },

    /// Persisted and invalidated; navigate to `path`
    Redirect { path: String },
}

impl Outcome {
    pub fn invalid(message: impl Into<String>, errors: FieldErrors) -> Self {
        Outcome::Invalid {
            message: message.into(),
            errors,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Outcome::Failed {
            message: message.into(),
        }
    }

    pub fn redirect(path: impl Into<String>) -> Self {
        Outcome::Redirect { path: path.into() }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Outcome::Redirect { .. })
    }

    /// Top-level message shown above the form, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Invalid { message, .. } | Outcome::Failed { message } => Some(message),
            Outcome::Redirect { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Outcome::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Form state re-rendered after a rejected submission
#[derive(Debug, Serialize)]
pub struct FormState<'a> {
    pub message: Option<&'a str>,
    pub errors: Option<&'a FieldErrors>,
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match &self {
            Outcome::Redirect { path } => {
                (StatusCode::SEE_OTHER, [(header::LOCATION, path.clone())]).into_response()
            }
            _ => {
                let state = FormState {
                    message: self.message(),
                    errors: self.errors(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::{FailureKind, FieldFailure};

    #[test]
    fn test_redirect_has_no_message() {
        let outcome = Outcome::redirect("/dashboard/invoices");
        assert!(outcome.is_redirect());
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_redirect_response_is_see_other() {
        let response = Outcome::redirect("/dashboard/invoices").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/dashboard/invoices"
        );
    }

    #[test]
    fn test_invalid_response_is_unprocessable() {
        let mut errors = FieldErrors::new();
        errors.push(
            "status",
            FieldFailure {
                kind: FailureKind::InvalidType,
                message: "Please select an invoice status.".to_string(),
            },
        );
        let response = Outcome::invalid("Missing fields. Failed to create invoice.", errors)
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_failed_serializes_with_kind_tag() {
        let json = serde_json::to_value(Outcome::failed("Database error")).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["message"], "Database error");
    }
}
