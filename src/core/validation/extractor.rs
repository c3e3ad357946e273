//! Axum extractor for raw form submissions
//!
//! Mutations validate against a [`FormSchema`](super::FormSchema) themselves so
//! that field errors come back as form state rather than as an HTTP rejection.
//! This extractor only decodes the `application/x-www-form-urlencoded` body
//! into a [`FormInput`] map.

use super::schema::FormInput;
use crate::core::error::{DashboardError, ValidationError};
use axum::extract::{Form, FromRequest, Request};

/// Untyped form body: field name to submitted string
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_invoice(
///     State(state): State<AppState>,
///     FormFields(input): FormFields,
/// ) -> Response {
///     state.mutations.create_invoice(&input).await.into_response()
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormFields(pub FormInput);

impl FormFields {
    pub fn into_inner(self) -> FormInput {
        self.0
    }
}

impl std::ops::Deref for FormFields {
    type Target = FormInput;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<FormInput>::from_request(req, state).await {
            Ok(Form(input)) => Ok(FormFields(input)),
            Err(e) => Err(ValidationError::InvalidForm {
                message: e.body_text(),
            }
            .into()),
        }
    }
}
