//! In-memory invoice and user storage for testing and development

use crate::core::auth::hash_password;
use crate::core::invoice::{
    Customer, Invoice, InvoiceChanges, InvoiceRow, InvoiceStatus, NewInvoice, User,
};
use crate::core::service::{InvoiceStore, UserStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store implementation
///
/// Enforces the customer foreign key the way a relational store would. Uses
/// `tokio::sync::RwLock` for async-safe access.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
    customers: Arc<RwLock<Vec<Customer>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryInvoiceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from existing records
    pub fn from_parts(customers: Vec<Customer>, invoices: Vec<Invoice>, users: Vec<User>) -> Self {
        Self {
            invoices: Arc::new(RwLock::new(
                invoices.into_iter().map(|i| (i.id.clone(), i)).collect(),
            )),
            customers: Arc::new(RwLock::new(customers)),
            users: Arc::new(RwLock::new(
                users.into_iter().map(|u| (u.email.clone(), u)).collect(),
            )),
        }
    }

    /// Store holding the sample customers and no invoices
    pub fn with_sample_customers() -> Self {
        Self::from_parts(sample_customers(), Vec::new(), Vec::new())
    }

    /// Store holding the sample customers, a few invoices and one user
    /// (`user@nextmail.com` / `123456`)
    pub fn with_sample_data() -> Self {
        Self::from_parts(sample_customers(), sample_invoices(), vec![sample_user()])
    }

    fn customer_exists(customers: &[Customer], id: &str) -> bool {
        customers.iter().any(|c| c.id == id)
    }

    fn matches(row: &InvoiceRow, needle: &str) -> bool {
        needle.is_empty()
            || row.name.to_lowercase().contains(needle)
            || row.email.to_lowercase().contains(needle)
            || row.amount.to_string().contains(needle)
            || row.date.to_string().contains(needle)
            || row.status.as_str().contains(needle)
    }

    async fn matching_rows(&self, query: &str) -> Vec<InvoiceRow> {
        let invoices = self.invoices.read().await;
        let customers = self.customers.read().await;
        let needle = query.to_lowercase();

        let mut rows: Vec<InvoiceRow> = invoices
            .values()
            .filter_map(|invoice| {
                let customer = customers.iter().find(|c| c.id == invoice.customer_id)?;
                Some(InvoiceRow {
                    id: invoice.id.clone(),
                    customer_id: invoice.customer_id.clone(),
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                    date: invoice.date,
                    amount: invoice.amount,
                    status: invoice.status,
                })
            })
            .filter(|row| Self::matches(row, &needle))
            .collect();

        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        rows
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, invoice: NewInvoice) -> Result<String> {
        let customers = self.customers.read().await;
        if !Self::customer_exists(&customers, &invoice.customer_id) {
            return Err(anyhow!(
                "insert on table \"invoices\" violates foreign key constraint: unknown customer '{}'",
                invoice.customer_id
            ));
        }

        let id = Uuid::new_v4().to_string();
        let mut invoices = self.invoices.write().await;
        invoices.insert(
            id.clone(),
            Invoice {
                id: id.clone(),
                customer_id: invoice.customer_id,
                amount: invoice.amount,
                status: invoice.status,
                date: invoice.date,
            },
        );

        Ok(id)
    }

    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()> {
        let customers = self.customers.read().await;
        if !Self::customer_exists(&customers, &changes.customer_id) {
            return Err(anyhow!(
                "update on table \"invoices\" violates foreign key constraint: unknown customer '{}'",
                changes.customer_id
            ));
        }

        let mut invoices = self.invoices.write().await;
        if let Some(invoice) = invoices.get_mut(id) {
            invoice.customer_id = changes.customer_id;
            invoice.amount = changes.amount;
            invoice.status = changes.status;
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut invoices = self.invoices.write().await;
        invoices.remove(id);
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Invoice>> {
        let invoices = self.invoices.read().await;
        Ok(invoices.get(id).cloned())
    }

    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Vec<InvoiceRow>> {
        Ok(self
            .matching_rows(query)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self, query: &str) -> Result<usize> {
        Ok(self.matching_rows(query).await.len())
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        let mut customers = self.customers.read().await.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }
}

#[async_trait]
impl UserStore for InMemoryInvoiceStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }
}

fn customer(id: &str, name: &str, email: &str, image: &str) -> Customer {
    Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        image_url: format!("/customers/{}.png", image),
    }
}

pub fn sample_customers() -> Vec<Customer> {
    vec![
        customer(
            "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa",
            "Evil Rabbit",
            "evil@rabbit.com",
            "evil-rabbit",
        ),
        customer(
            "3958dc9e-712f-4377-85e9-fec4b6a6442a",
            "Delba de Oliveira",
            "delba@oliveira.com",
            "delba-de-oliveira",
        ),
        customer(
            "3958dc9e-742f-4377-85e9-fec4b6a6442a",
            "Lee Robinson",
            "lee@robinson.com",
            "lee-robinson",
        ),
        customer(
            "76d65c26-f784-44a2-ac19-586678f7c2f2",
            "Michael Novotny",
            "michael@novotny.com",
            "michael-novotny",
        ),
        customer(
            "CC27C14A-0ACF-4F4A-A6C9-D45682C144B9",
            "Amy Burns",
            "amy@burns.com",
            "amy-burns",
        ),
        customer(
            "13D07535-C59E-4157-A011-F8D2EF4E0CBB",
            "Balazs Orban",
            "balazs@orban.com",
            "balazs-orban",
        ),
    ]
}

fn sample_invoices() -> Vec<Invoice> {
    let customers = sample_customers();
    let rows: [(usize, i64, InvoiceStatus, (i32, u32, u32)); 8] = [
        (0, 15795, InvoiceStatus::Pending, (2022, 12, 6)),
        (1, 20348, InvoiceStatus::Pending, (2022, 11, 14)),
        (4, 3040, InvoiceStatus::Paid, (2022, 10, 29)),
        (3, 44800, InvoiceStatus::Paid, (2023, 9, 10)),
        (5, 34577, InvoiceStatus::Pending, (2023, 8, 5)),
        (2, 54246, InvoiceStatus::Pending, (2023, 7, 16)),
        (0, 666, InvoiceStatus::Pending, (2023, 6, 27)),
        (3, 32545, InvoiceStatus::Paid, (2023, 6, 9)),
    ];

    rows.into_iter()
        .filter_map(|(customer, amount, status, (y, m, d))| {
            Some(Invoice {
                id: Uuid::new_v4().to_string(),
                customer_id: customers.get(customer)?.id.clone(),
                amount,
                status,
                date: NaiveDate::from_ymd_opt(y, m, d)?,
            })
        })
        .collect()
}

fn sample_user() -> User {
    User {
        id: "410544b2-4001-4271-9855-fec4b6a6442a".to_string(),
        name: "User".to_string(),
        email: "user@nextmail.com".to_string(),
        password: hash_password("123456"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_invoice(customer_id: &str, amount: i64, date: (i32, u32, u32)) -> NewInvoice {
        NewInvoice {
            customer_id: customer_id.to_string(),
            amount,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = InMemoryInvoiceStore::with_sample_customers();
        let customer = sample_customers()[0].id.clone();

        let id = store
            .insert(new_invoice(&customer, 1234, (2023, 1, 2)))
            .await
            .unwrap();

        let invoice = store.find(&id).await.unwrap().unwrap();
        assert_eq!(invoice.amount, 1234);
        assert_eq!(invoice.customer_id, customer);
    }

    #[tokio::test]
    async fn test_insert_unknown_customer_fails() {
        let store = InMemoryInvoiceStore::with_sample_customers();
        let result = store.insert(new_invoice("nope", 100, (2023, 1, 2))).await;
        assert!(result.is_err());
        assert_eq!(store.count("").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_date() {
        let store = InMemoryInvoiceStore::with_sample_customers();
        let customers = sample_customers();
        let id = store
            .insert(new_invoice(&customers[0].id, 100, (2020, 2, 3)))
            .await
            .unwrap();

        store
            .update(
                &id,
                InvoiceChanges {
                    customer_id: customers[1].id.clone(),
                    amount: 999,
                    status: InvoiceStatus::Paid,
                },
            )
            .await
            .unwrap();

        let invoice = store.find(&id).await.unwrap().unwrap();
        assert_eq!(invoice.id, id);
        assert_eq!(invoice.amount, 999);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2020, 2, 3).unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_invoice() {
        let store = InMemoryInvoiceStore::with_sample_customers();
        let id = store
            .insert(new_invoice(&sample_customers()[0].id, 100, (2020, 2, 3)))
            .await
            .unwrap();

        store.delete(&id).await.unwrap();
        assert!(store.find(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_newest_first() {
        let store = InMemoryInvoiceStore::with_sample_data();

        let rows = store.search("LEE", 10, 0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Lee Robinson");

        let all = store.search("", 100, 0).await.unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn test_search_matches_status_and_amount() {
        let store = InMemoryInvoiceStore::with_sample_data();
        assert_eq!(store.count("paid").await.unwrap(), 3);
        assert_eq!(store.count("15795").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_pages_with_offset() {
        let store = InMemoryInvoiceStore::with_sample_data();
        let first = store.search("", 6, 0).await.unwrap();
        let second = store.search("", 6, 6).await.unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_customers_sorted_by_name() {
        let store = InMemoryInvoiceStore::with_sample_customers();
        let names: Vec<String> = store
            .customers()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names[0], "Amy Burns");
        assert_eq!(names[5], "Michael Novotny");
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let store = InMemoryInvoiceStore::with_sample_data();
        let user = store.find_by_email("user@nextmail.com").await.unwrap();
        assert!(user.is_some());
        assert!(store.find_by_email("x@y.z").await.unwrap().is_none());
    }
}
