//! Core module containing the dashboard's domain types, traits and services

pub mod auth;
pub mod cache;
pub mod error;
pub mod invoice;
pub mod mutations;
pub mod outcome;
pub mod query;
pub mod service;
pub mod validation;

pub use auth::{
    AuthErrorKind, Authenticator, CREDENTIALS_PROVIDER, Credentials, CredentialsAuthenticator,
    SignInError, hash_password,
};
pub use cache::{InvalidationLog, PathInvalidator, ViewCache};
pub use error::{DashboardError, DashboardResult, ErrorResponse};
pub use invoice::{
    Customer, Invoice, InvoiceChanges, InvoiceDraft, InvoiceForm, InvoiceRow, InvoiceStatus,
    NewInvoice, User,
};
pub use mutations::{Clock, DASHBOARD_PATH, INVOICES_PATH, MutationService, SystemClock};
pub use outcome::Outcome;
pub use query::{
    ITEMS_PER_PAGE, InvoiceListParams, InvoicePage, PageItem, format_currency,
    generate_pagination,
};
pub use service::{InvoiceStore, UserStore};
