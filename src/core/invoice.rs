//! Invoice, customer and user records

use crate::core::validation::validators::Validator;
use crate::core::validation::{
    FailureKind, FieldRule, FormSchema, ValidFields, filters, validators,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: &'static [&'static str] = &["pending", "paid"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(anyhow::anyhow!("Unknown invoice status: {}", other)),
        }
    }
}

/// A stored invoice; `amount` is in cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Invoice row for the list view, joined with its customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Invoice as pre-filled into the edit form; `amount` is in dollars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceForm {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl From<Invoice> for InvoiceForm {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: invoice.amount as f64 / 100.0,
            status: invoice.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Dashboard user; `password` holds the hex SHA-256 digest, never plaintext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Values inserted by a create; the id is assigned by storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Columns an update may touch; `id` and `date` are deliberately absent
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

pub const CUSTOMER_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";

/// Schema shared by create and update; `id` and `date` are not form fields
pub fn invoice_schema() -> FormSchema {
    FormSchema::new()
        .field(
            FieldRule::text("customerId", CUSTOMER_MESSAGE)
                .filter(filters::trim())
                .check(validators::required(), CUSTOMER_MESSAGE),
        )
        .field(
            FieldRule::number("amount", AMOUNT_MESSAGE)
                .filter(filters::trim())
                .check(validators::positive(), AMOUNT_MESSAGE)
                .check(billable_cents(), AMOUNT_MESSAGE),
        )
        .field(
            FieldRule::text("status", STATUS_MESSAGE)
                .filter(filters::trim())
                .check(validators::in_list(InvoiceStatus::ALL), STATUS_MESSAGE),
        )
}

/// Convert major units to cents, rounding away float noise (`12.34 -> 1234`)
///
/// Returns `None` when the rounded value does not fit the `BIGINT` column.
pub fn to_cents(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    (cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64)
        .then_some(cents as i64)
}

/// Validator: amount rounds to at least one storable cent
fn billable_cents() -> Validator {
    Arc::new(|_: &str, value: &Value| match value.as_f64() {
        Some(amount) => match to_cents(amount) {
            Some(cents) if cents >= 1 => Ok(()),
            _ => Err(FailureKind::ConstraintViolation),
        },
        None => Err(FailureKind::InvalidType),
    })
}

/// Normalized invoice fields from a submission that passed [`invoice_schema`]
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub customer_id: String,
    pub amount_in_cents: i64,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    pub fn from_fields(fields: &ValidFields) -> anyhow::Result<Self> {
        let customer_id = fields
            .text("customerId")
            .ok_or_else(|| anyhow::anyhow!("validated form is missing customerId"))?;
        let amount = fields
            .number("amount")
            .ok_or_else(|| anyhow::anyhow!("validated form is missing amount"))?;
        let amount_in_cents = to_cents(amount)
            .ok_or_else(|| anyhow::anyhow!("validated amount {} does not fit in cents", amount))?;
        let status = fields
            .text("status")
            .ok_or_else(|| anyhow::anyhow!("validated form is missing status"))?
            .parse()?;

        Ok(Self {
            customer_id: customer_id.to_string(),
            amount_in_cents,
            status,
        })
    }

    pub fn into_new_invoice(self, date: NaiveDate) -> NewInvoice {
        NewInvoice {
            customer_id: self.customer_id,
            amount: self.amount_in_cents,
            status: self.status,
            date,
        }
    }

    pub fn into_changes(self) -> InvoiceChanges {
        InvoiceChanges {
            customer_id: self.customer_id,
            amount: self.amount_in_cents,
            status: self.status,
        }
    }
}
