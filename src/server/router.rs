//! Route table for the dashboard

use super::handlers::{
    create_invoice, delete_invoice, get_invoice, list_customers, list_invoices, login,
    update_invoice,
};
use super::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build dashboard routes
///
/// - POST /login - Sign in with email and password
/// - GET /dashboard/invoices - Filtered, paginated invoice list
/// - POST /dashboard/invoices/create - Create an invoice
/// - GET /dashboard/invoices/{id} - Invoice for the edit form
/// - POST /dashboard/invoices/{id}/edit - Update an invoice
/// - POST /dashboard/invoices/{id}/delete - Delete an invoice
/// - GET /dashboard/customers - Customers for the invoice form
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/dashboard/invoices", get(list_invoices))
        .route("/dashboard/invoices/create", post(create_invoice))
        .route("/dashboard/invoices/{id}", get(get_invoice))
        .route("/dashboard/invoices/{id}/edit", post(update_invoice))
        .route("/dashboard/invoices/{id}/delete", post(delete_invoice))
        .route("/dashboard/customers", get(list_customers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
