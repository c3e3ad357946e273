//! Application state shared across handlers

use crate::core::cache::ViewCache;
use crate::core::error::{DashboardError, StorageError};
use crate::core::mutations::MutationService;
use crate::core::service::InvoiceStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub mutations: MutationService,
    pub store: Arc<dyn InvoiceStore>,
    /// Rendered list pages; also the invalidator handed to `mutations`
    pub cache: Arc<ViewCache>,
    pub items_per_page: usize,
    /// Storage backend name, used in error reports
    pub backend: &'static str,
}

impl AppState {
    /// Wrap a failed read in a [`StorageError`]
    pub fn storage_error(&self, err: anyhow::Error) -> DashboardError {
        tracing::error!(backend = self.backend, error = %err, "storage read failed");
        StorageError::QueryError {
            backend: self.backend.to_string(),
            message: err.to_string(),
        }
        .into()
    }
}
