//! Invoice mutations and sign-in
//!
//! Every form mutation follows the same path:
//!
//! ```text
//! Received -> Validating -> Invalid                       (form re-rendered)
//!                        -> Valid -> Persisting -> Failed (form re-rendered)
//!                                               -> Persisted -> Invalidating -> Redirect
//! ```
//!
//! Invalidation happens only after storage accepted the write, and nothing
//! runs after the redirect is produced.

use crate::core::auth::{AuthErrorKind, Authenticator, CREDENTIALS_PROVIDER, SignInError};
use crate::core::cache::PathInvalidator;
use crate::core::error::{DashboardError, DashboardResult, InvoiceError};
use crate::core::invoice::{InvoiceDraft, invoice_schema};
use crate::core::outcome::Outcome;
use crate::core::service::InvoiceStore;
use crate::core::validation::{FormInput, FormSchema, Validation};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// List view refreshed and navigated to after every invoice mutation
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Where a successful sign-in lands
pub const DASHBOARD_PATH: &str = "/dashboard";

const CREATE_INVALID: &str = "Missing fields. Failed to create invoice.";
const CREATE_FAILED: &str = "Database error: Failed to create invoice.";
const UPDATE_INVALID: &str = "Missing fields. Failed to update invoice.";
const UPDATE_FAILED: &str = "Database error: Failed to update invoice.";
const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const SIGN_IN_FAILED: &str = "Something went wrong.";

/// Source of the issue date stamped on new invoices
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// UTC calendar date of the call
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Applies validated form submissions to storage
///
/// Owns no state of its own; each call is one request/response cycle against
/// the injected collaborators.
#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn InvoiceStore>,
    invalidator: Arc<dyn PathInvalidator>,
    authenticator: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    schema: FormSchema,
}

impl MutationService {
    pub fn new(
        store: Arc<dyn InvoiceStore>,
        invalidator: Arc<dyn PathInvalidator>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            store,
            invalidator,
            authenticator,
            clock: Arc::new(SystemClock),
            schema: invoice_schema(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn draft(&self, input: &FormInput, invalid_message: &str) -> Result<InvoiceDraft, Outcome> {
        match self.schema.validate(input) {
            Validation::Valid(fields) => InvoiceDraft::from_fields(&fields).map_err(|e| {
                tracing::error!(error = %e, "validated invoice form could not be read");
                Outcome::invalid(invalid_message, Default::default())
            }),
            Validation::Invalid(errors) => Err(Outcome::invalid(invalid_message, errors)),
        }
    }

    fn finish(&self) -> Outcome {
        self.invalidator.invalidate(INVOICES_PATH);
        Outcome::redirect(INVOICES_PATH)
    }

    /// Create an invoice dated today
    pub async fn create_invoice(&self, input: &FormInput) -> Outcome {
        let draft = match self.draft(input, CREATE_INVALID) {
            Ok(draft) => draft,
            Err(outcome) => return outcome,
        };

        let invoice = draft.into_new_invoice(self.clock.today());
        match self.store.insert(invoice).await {
            Ok(id) => {
                tracing::info!(invoice_id = %id, "invoice created");
                self.finish()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create invoice");
                Outcome::failed(CREATE_FAILED)
            }
        }
    }

    /// Update customer, amount and status of invoice `id`; its date is kept
    pub async fn update_invoice(&self, id: &str, input: &FormInput) -> Outcome {
        let draft = match self.draft(input, UPDATE_INVALID) {
            Ok(draft) => draft,
            Err(outcome) => return outcome,
        };

        match self.store.update(id, draft.into_changes()).await {
            Ok(()) => {
                tracing::info!(invoice_id = %id, "invoice updated");
                self.finish()
            }
            Err(e) => {
                tracing::error!(invoice_id = %id, error = %e, "Failed to update invoice");
                Outcome::failed(UPDATE_FAILED)
            }
        }
    }

    /// Delete invoice `id`
    ///
    /// There is no form to report back to, so a storage failure is returned
    /// as an error for the caller's default handling.
    pub async fn delete_invoice(&self, id: &str) -> DashboardResult<()> {
        if let Err(e) = self.store.delete(id).await {
            tracing::error!(invoice_id = %id, error = %e, "Failed to delete invoice");
            return Err(InvoiceError::DeleteFailed {
                id: id.to_string(),
                message: e.to_string(),
            }
            .into());
        }

        tracing::info!(invoice_id = %id, "invoice deleted");
        self.invalidator.invalidate(INVOICES_PATH);
        Ok(())
    }

    /// Sign in with the credentials provider
    ///
    /// Returns `Ok(None)` once a session is established, `Ok(Some(message))`
    /// for recognized authentication failures, and `Err` for anything that
    /// did not come from the authenticator's failure taxonomy.
    pub async fn authenticate(
        &self,
        _prev_state: Option<&str>,
        input: &FormInput,
    ) -> DashboardResult<Option<String>> {
        match self.authenticator.sign_in(CREDENTIALS_PROVIDER, input).await {
            Ok(()) => Ok(None),
            Err(SignInError::Auth { kind }) => {
                tracing::warn!(kind = %kind, "sign-in rejected");
                let message = match kind {
                    AuthErrorKind::CredentialsSignin => INVALID_CREDENTIALS,
                    _ => SIGN_IN_FAILED,
                };
                Ok(Some(message.to_string()))
            }
            Err(SignInError::Foreign(e)) => Err(DashboardError::Internal(e.to_string())),
        }
    }
}
