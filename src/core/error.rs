//! Typed error handling for the invoice dashboard
//!
//! Errors are split by the tier they belong to:
//!
//! - [`ValidationError`]: user-correctable input problems
//! - [`StorageError`]: failures reported by a storage backend
//! - [`InvoiceError`]: invoice lookups and mutations that cannot proceed
//! - [`ConfigError`]: configuration parsing and loading
//!
//! Form mutations never surface these directly to the end user: create and
//! update turn storage failures into a generic message (see
//! [`crate::core::outcome::Outcome`]). Only fatal paths (delete, foreign
//! authentication errors) propagate a [`DashboardError`] to the HTTP layer.
//!
//! # Example
//!
//! ```rust,ignore
//! match service.delete_invoice(&id).await {
//!     Ok(()) => {}
//!     Err(DashboardError::Storage(e)) => tracing::error!("{}", e),
//!     Err(e) => return Err(e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the dashboard
#[derive(Debug)]
pub enum DashboardError {
    /// Invoice-related errors
    Invoice(InvoiceError),

    /// Validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors, including failures that did not originate from a
    /// known collaborator
    Internal(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Invoice(e) => write!(f, "{}", e),
            DashboardError::Validation(e) => write!(f, "{}", e),
            DashboardError::Storage(e) => write!(f, "{}", e),
            DashboardError::Config(e) => write!(f, "{}", e),
            DashboardError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Invoice(e) => Some(e),
            DashboardError::Validation(e) => Some(e),
            DashboardError::Storage(e) => Some(e),
            DashboardError::Config(e) => Some(e),
            DashboardError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl DashboardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Invoice(e) => e.status_code(),
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::Invoice(e) => e.error_code(),
            DashboardError::Validation(_) => "VALIDATION_ERROR",
            DashboardError::Storage(_) => "STORAGE_ERROR",
            DashboardError::Config(_) => "CONFIG_ERROR",
            DashboardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    ///
    /// Storage and internal failures are reported with a generic message so
    /// raw backend text never reaches the client.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            DashboardError::Storage(_) | DashboardError::Internal(_) => {
                "Something went wrong.".to_string()
            }
            _ => self.to_string(),
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DashboardError::Invoice(InvoiceError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Invoice Errors
// =============================================================================

/// Errors related to invoice operations
#[derive(Debug)]
pub enum InvoiceError {
    /// No invoice with this id
    NotFound { id: String },

    /// Deleting an invoice failed in storage
    DeleteFailed { id: String, message: String },
}

impl fmt::Display for InvoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceError::NotFound { id } => write!(f, "Invoice with id '{}' not found", id),
            InvoiceError::DeleteFailed { id, .. } => {
                write!(f, "Database error: Failed to delete invoice '{}'", id)
            }
        }
    }
}

impl std::error::Error for InvoiceError {}

impl InvoiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InvoiceError::DeleteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InvoiceError::NotFound { .. } => "INVOICE_NOT_FOUND",
            InvoiceError::DeleteFailed { .. } => "INVOICE_DELETE_FAILED",
        }
    }
}

impl From<InvoiceError> for DashboardError {
    fn from(err: InvoiceError) -> Self {
        DashboardError::Invoice(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Request body could not be decoded as a form
    InvalidForm { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidForm { message } => {
                write!(f, "Invalid form submission: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        DashboardError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Query execution error
    QueryError { backend: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query failed: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for DashboardError {
    fn from(err: StorageError) -> Self {
        DashboardError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                match file {
                    Some(file) => write!(f, "Invalid YAML in '{}': {}", file, message),
                    None => write!(f, "Invalid YAML: {}", message),
                }
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Internal(err.to_string())
    }
}

/// Result type alias using DashboardError
pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = DashboardError::from(InvoiceError::NotFound {
            id: "abc".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "INVOICE_NOT_FOUND");
    }

    #[test]
    fn test_storage_error_hides_backend_text() {
        let err = DashboardError::from(StorageError::QueryError {
            backend: "PostgreSQL".to_string(),
            message: "relation \"invoices\" does not exist".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "STORAGE_ERROR");
        assert!(!response.message.contains("relation"));
    }

    #[test]
    fn test_config_error_display_with_file() {
        let err = ConfigError::ParseError {
            file: Some("dashboard.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid YAML in 'dashboard.yaml': bad indent"
        );
    }
}
