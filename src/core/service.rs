//! Storage traits for invoices, customers and users

use crate::core::invoice::{Customer, Invoice, InvoiceChanges, InvoiceRow, NewInvoice, User};
use anyhow::Result;
use async_trait::async_trait;

/// Invoice storage
///
/// Every write is a single statement. Implementations must pass all values as
/// bound parameters; none of these methods builds SQL from user input.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice and return its generated id
    async fn insert(&self, invoice: NewInvoice) -> Result<String>;

    /// Overwrite customer, amount and status of the invoice matching `id`
    ///
    /// Matching no row is not an error.
    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()>;

    /// Delete the invoice matching `id`
    async fn delete(&self, id: &str) -> Result<()>;

    /// Get an invoice by id
    async fn find(&self, id: &str) -> Result<Option<Invoice>>;

    /// Rows matching `query` (case-insensitive, over customer name, email,
    /// amount, date and status), newest first
    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<InvoiceRow>>;

    /// Number of rows [`search`](Self::search) would match without paging
    async fn count(&self, query: &str) -> Result<usize>;

    /// All customers ordered by name
    async fn customers(&self) -> Result<Vec<Customer>>;
}

/// User lookup for credential sign-in
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
