//! Integration tests for the PostgreSQL invoice store.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool` and truncates tables before running.

#![cfg(feature = "postgres")]

use chrono::NaiveDate;
use dashboard::core::auth::hash_password;
use dashboard::core::invoice::{InvoiceChanges, InvoiceStatus, NewInvoice};
use dashboard::core::service::{InvoiceStore, UserStore};
use dashboard::storage::PgInvoiceStore;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

/// Holds the testcontainer handle (keeps it alive) and the connection URL.
struct PgTestEnv {
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

/// Uses `OnceLock` (std, not tokio) because the container must outlive
/// individual tokio runtimes created by `#[tokio::test]`.
static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container, is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    // Connecting through the store applies migrations
    let store = PgInvoiceStore::connect(&url)
        .await
        .expect("Failed to prepare PostgreSQL");
    drop(store);

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

async fn pg_pool() -> PgPool {
    let env = init_pg_env().await;
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

const CUSTOMER_A: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
const CUSTOMER_B: &str = "76d65c26-f784-44a2-ac19-586678f7c2f2";

/// Fresh store over truncated tables with two customers and one user
async fn clean_store() -> PgInvoiceStore {
    let pool = pg_pool().await;
    sqlx::query("TRUNCATE invoices, customers, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    for (id, name, email) in [
        (CUSTOMER_A, "Delba de Oliveira", "delba@oliveira.com"),
        (CUSTOMER_B, "Michael Novotny", "michael@novotny.com"),
    ] {
        sqlx::query(
            "INSERT INTO customers (id, name, email, image_url) VALUES ($1::uuid, $2, $3, $4)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind("/customers/placeholder.png")
        .execute(&pool)
        .await
        .expect("Failed to seed customers");
    }

    sqlx::query("INSERT INTO users (name, email, password) VALUES ($1, $2, $3)")
        .bind("User")
        .bind("user@nextmail.com")
        .bind(hash_password("123456"))
        .execute(&pool)
        .await
        .expect("Failed to seed users");

    PgInvoiceStore::new(pool)
}

fn new_invoice(customer_id: &str, amount: i64, day: u32) -> NewInvoice {
    NewInvoice {
        customer_id: customer_id.to_string(),
        amount,
        status: InvoiceStatus::Pending,
        date: NaiveDate::from_ymd_opt(2023, 5, day).unwrap(),
    }
}

#[tokio::test]
async fn test_insert_and_find() {
    let store = clean_store().await;

    let id = store.insert(new_invoice(CUSTOMER_A, 1234, 1)).await.unwrap();
    let invoice = store.find(&id).await.unwrap().unwrap();

    assert_eq!(invoice.customer_id, CUSTOMER_A);
    assert_eq!(invoice.amount, 1234);
    assert_eq!(invoice.status, InvoiceStatus::Pending);
}

#[tokio::test]
async fn test_insert_unknown_customer_violates_foreign_key() {
    let store = clean_store().await;

    let result = store
        .insert(new_invoice("00000000-0000-0000-0000-000000000000", 1, 1))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_non_positive_amount_violates_check() {
    let store = clean_store().await;

    assert!(store.insert(new_invoice(CUSTOMER_A, 0, 1)).await.is_err());
    assert!(store.insert(new_invoice(CUSTOMER_A, -5, 1)).await.is_err());
    assert_eq!(store.count("").await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_leaves_date_alone() {
    let store = clean_store().await;
    let id = store.insert(new_invoice(CUSTOMER_A, 100, 7)).await.unwrap();

    store
        .update(
            &id,
            InvoiceChanges {
                customer_id: CUSTOMER_B.to_string(),
                amount: 200,
                status: InvoiceStatus::Paid,
            },
        )
        .await
        .unwrap();

    let invoice = store.find(&id).await.unwrap().unwrap();
    assert_eq!(invoice.customer_id, CUSTOMER_B);
    assert_eq!(invoice.amount, 200);
    assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2023, 5, 7).unwrap());
}

#[tokio::test]
async fn test_delete() {
    let store = clean_store().await;
    let id = store.insert(new_invoice(CUSTOMER_A, 100, 7)).await.unwrap();

    store.delete(&id).await.unwrap();

    assert!(store.find(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_is_parameterized_and_case_insensitive() {
    let store = clean_store().await;
    store.insert(new_invoice(CUSTOMER_A, 100, 1)).await.unwrap();
    store.insert(new_invoice(CUSTOMER_B, 200, 2)).await.unwrap();

    let rows = store.search("DELBA", 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Delba de Oliveira");

    let injected = store.search("' OR 1=1 --", 10, 0).await.unwrap();
    assert!(injected.is_empty());

    assert_eq!(store.count("").await.unwrap(), 2);
    let newest = store.search("", 1, 0).await.unwrap();
    assert_eq!(newest[0].customer_id, CUSTOMER_B);
}

#[tokio::test]
async fn test_customers_and_users() {
    let store = clean_store().await;

    let customers = store.customers().await.unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].name, "Delba de Oliveira");

    let user = store
        .find_by_email("user@nextmail.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.password, hash_password("123456"));
}
