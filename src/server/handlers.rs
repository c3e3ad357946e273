//! HTTP handlers for invoice forms, sign-in and the read model
//!
//! Form posts answer with the mutation [`Outcome`]: `303 See Other` on
//! success, `422` with the form state otherwise.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::state::AppState;
use crate::core::error::{DashboardResult, InvoiceError};
use crate::core::invoice::{Customer, InvoiceForm, InvoiceRow};
use crate::core::mutations::{DASHBOARD_PATH, INVOICES_PATH};
use crate::core::outcome::{FormState, Outcome};
use crate::core::query::{
    InvoiceListParams, InvoicePage, format_currency, generate_pagination, page_count,
};
use crate::core::validation::FormFields;

/// Invoice row with its amount rendered for display
#[derive(Debug, Serialize)]
pub struct InvoiceListItem {
    #[serde(flatten)]
    pub row: InvoiceRow,
    pub formatted_amount: String,
}

impl From<InvoiceRow> for InvoiceListItem {
    fn from(row: InvoiceRow) -> Self {
        let formatted_amount = format_currency(row.amount);
        Self {
            row,
            formatted_amount,
        }
    }
}

/// POST /dashboard/invoices/create
pub async fn create_invoice(
    State(state): State<AppState>,
    FormFields(input): FormFields,
) -> Outcome {
    state.mutations.create_invoice(&input).await
}

/// POST /dashboard/invoices/{id}/edit
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormFields(input): FormFields,
) -> Outcome {
    state.mutations.update_invoice(&id, &input).await
}

/// POST /dashboard/invoices/{id}/delete
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DashboardResult<Outcome> {
    state.mutations.delete_invoice(&id).await?;
    Ok(Outcome::redirect(INVOICES_PATH))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    FormFields(input): FormFields,
) -> DashboardResult<Response> {
    let response = match state.mutations.authenticate(None, &input).await? {
        None => Outcome::redirect(DASHBOARD_PATH).into_response(),
        Some(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(FormState {
                message: Some(&message),
                errors: None,
            }),
        )
            .into_response(),
    };
    Ok(response)
}

/// GET /dashboard/invoices?query=&page=
///
/// Pages are served from the view cache until a mutation invalidates the
/// list path. A page read while an invalidation lands is answered but not
/// cached.
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<InvoiceListParams>,
) -> DashboardResult<Json<serde_json::Value>> {
    let query = params.query();
    let page = params.page();
    let key = format!("page={}&query={}", page, query);

    if let Some(view) = state.cache.get(INVOICES_PATH, &key) {
        tracing::debug!(key = %key, "invoice list served from cache");
        return Ok(Json(view));
    }

    let generation = state.cache.generation(INVOICES_PATH);
    let per_page = state.items_per_page;
    let offset = (page - 1).saturating_mul(per_page);
    let rows = state
        .store
        .search(query, per_page, offset)
        .await
        .map_err(|e| state.storage_error(e))?;
    let total = state
        .store
        .count(query)
        .await
        .map_err(|e| state.storage_error(e))?;
    let total_pages = page_count(total, per_page);

    let view = serde_json::to_value(InvoicePage {
        rows: rows.into_iter().map(InvoiceListItem::from).collect(),
        page,
        total_pages,
        pagination: generate_pagination(page, total_pages),
    })
    .map_err(anyhow::Error::from)?;

    if !state
        .cache
        .put_if_current(INVOICES_PATH, &key, view.clone(), generation)
    {
        tracing::debug!(key = %key, "invoice list invalidated while reading, not cached");
    }
    Ok(Json(view))
}

/// GET /dashboard/invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DashboardResult<Json<InvoiceForm>> {
    let invoice = state
        .store
        .find(&id)
        .await
        .map_err(|e| state.storage_error(e))?
        .ok_or_else(|| InvoiceError::NotFound { id: id.clone() })?;

    Ok(Json(InvoiceForm::from(invoice)))
}

/// GET /dashboard/customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> DashboardResult<Json<Vec<Customer>>> {
    let customers = state
        .store
        .customers()
        .await
        .map_err(|e| state.storage_error(e))?;

    Ok(Json(customers))
}
