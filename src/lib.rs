//! # Invoice Dashboard
//!
//! Server side of an invoice dashboard: validated form mutations over an
//! invoice store, credential sign-in, a cached read model, and a debounced
//! search term reflector that keeps the list URL shareable.
//!
//! ## Features
//!
//! - **Declarative Validation**: forms are checked against a [`FormSchema`](core::validation::FormSchema), every failing field is reported at once
//! - **Explicit Outcomes**: mutations return [`Outcome`](core::outcome::Outcome) instead of redirecting mid-flight
//! - **Injected Collaborators**: storage, cache invalidation, sign-in and the clock are traits
//! - **Storage Backends**: in-memory for tests and development, PostgreSQL behind the `postgres` feature
//! - **Search Reflection**: keystrokes are debounced into a single location replace
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dashboard::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryInvoiceStore::with_sample_data())
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod core;
pub mod search;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthErrorKind, Authenticator, CredentialsAuthenticator, SignInError},
        cache::{InvalidationLog, PathInvalidator, ViewCache},
        error::{DashboardError, DashboardResult},
        invoice::{Customer, Invoice, InvoiceRow, InvoiceStatus, User},
        mutations::{Clock, MutationService, SystemClock},
        outcome::Outcome,
        service::{InvoiceStore, UserStore},
        validation::{FieldRule, FormInput, FormSchema, Validation},
    };

    // === Search ===
    pub use crate::search::{Location, SearchReflector, UrlLocation};

    // === Storage ===
    pub use crate::storage::InMemoryInvoiceStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PgInvoiceStore;

    // === Config ===
    pub use crate::config::DashboardConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
