//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PgInvoiceStore`, implementing both [`InvoiceStore`] and
//! [`UserStore`] over a `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-dashboard = { version = "0.1.0", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Tables are created by the migrations under `migrations/`. Ids are native
//! `UUID` columns; they cross the trait boundary as strings, so every id
//! parameter is cast with `$n::uuid` and read back with `::text`.

use crate::core::invoice::{Customer, Invoice, InvoiceChanges, InvoiceRow, NewInvoice, User};
use crate::core::service::{InvoiceStore, UserStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

type InvoiceTuple = (String, String, i64, String, NaiveDate);
type RowTuple = (String, String, String, String, String, NaiveDate, i64, String);

const SEARCH_FILTER: &str = "customers.name ILIKE $1 \
     OR customers.email ILIKE $1 \
     OR invoices.amount::text ILIKE $1 \
     OR invoices.date::text ILIKE $1 \
     OR invoices.status ILIKE $1";

/// Invoice and user storage backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    /// Create a new `PgInvoiceStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and apply pending migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| anyhow!("Failed to connect to PostgreSQL: {}", e))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;

        Ok(Self::new(pool))
    }

    fn pattern(query: &str) -> String {
        format!("%{}%", query)
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert(&self, invoice: NewInvoice) -> Result<String> {
        let (id,): (String,) = sqlx::query_as(
            "INSERT INTO invoices (customer_id, amount, status, date) \
             VALUES ($1::uuid, $2, $3, $4) RETURNING id::text",
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to insert invoice: {}", e))?;

        Ok(id)
    }

    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()> {
        sqlx::query(
            "UPDATE invoices SET customer_id = $1::uuid, amount = $2, status = $3 \
             WHERE id = $4::uuid",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to update invoice: {}", e))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM invoices WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete invoice: {}", e))?;

        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceTuple>(
            "SELECT id::text, customer_id::text, amount, status, date \
             FROM invoices WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch invoice: {}", e))?;

        row.map(|(id, customer_id, amount, status, date)| {
            Ok(Invoice {
                id,
                customer_id,
                amount,
                status: status.parse()?,
                date,
            })
        })
        .transpose()
    }

    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<InvoiceRow>> {
        let sql = format!(
            "SELECT invoices.id::text, invoices.customer_id::text, customers.name, \
             customers.email, customers.image_url, invoices.date, invoices.amount, invoices.status \
             FROM invoices JOIN customers ON invoices.customer_id = customers.id \
             WHERE {} \
             ORDER BY invoices.date DESC, invoices.id \
             LIMIT $2 OFFSET $3",
            SEARCH_FILTER
        );

        let rows = sqlx::query_as::<_, RowTuple>(&sql)
            .bind(Self::pattern(query))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch invoices: {}", e))?;

        rows.into_iter()
            .map(
                |(id, customer_id, name, email, image_url, date, amount, status)| {
                    Ok(InvoiceRow {
                        id,
                        customer_id,
                        name,
                        email,
                        image_url,
                        date,
                        amount,
                        status: status.parse()?,
                    })
                },
            )
            .collect()
    }

    async fn count(&self, query: &str) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM invoices \
             JOIN customers ON invoices.customer_id = customers.id \
             WHERE {}",
            SEARCH_FILTER
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(Self::pattern(query))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to count invoices: {}", e))?;

        Ok(count.max(0) as usize)
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id::text, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch customers: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, image_url)| Customer {
                id,
                name,
                email,
                image_url,
            })
            .collect())
    }
}

#[async_trait]
impl UserStore for PgInvoiceStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id::text, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch user: {}", e))?;

        Ok(row.map(|(id, name, email, password)| User {
            id,
            name,
            email,
            password,
        }))
    }
}
