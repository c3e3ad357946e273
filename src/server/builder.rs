//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use super::state::AppState;
use crate::config::DashboardConfig;
use crate::core::auth::{Authenticator, CredentialsAuthenticator};
use crate::core::cache::ViewCache;
use crate::core::mutations::{Clock, MutationService};
use crate::core::service::{InvoiceStore, UserStore};
use crate::storage::InMemoryInvoiceStore;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the dashboard HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryInvoiceStore::with_sample_data())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn InvoiceStore>>,
    users: Option<Arc<dyn UserStore>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    clock: Option<Arc<dyn Clock>>,
    backend: &'static str,
    config: DashboardConfig,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            users: None,
            authenticator: None,
            clock: None,
            backend: "in-memory",
            config: DashboardConfig::default(),
        }
    }

    /// Builder for `config`, connecting to PostgreSQL when a database URL is
    /// set and falling back to the seeded in-memory store otherwise
    pub async fn from_config(config: DashboardConfig) -> Result<Self> {
        let builder = match config.database_url.as_deref() {
            #[cfg(feature = "postgres")]
            Some(url) => {
                let store = crate::storage::PgInvoiceStore::connect(url).await?;
                Self::new().with_store(store).with_backend("postgres")
            }
            #[cfg(not(feature = "postgres"))]
            Some(_) => {
                return Err(anyhow!(
                    "database_url is set but the `postgres` feature is disabled"
                ));
            }
            None => {
                tracing::warn!("no database_url configured, using in-memory sample data");
                Self::new().with_store(InMemoryInvoiceStore::with_sample_data())
            }
        };

        Ok(builder.with_config(config))
    }

    /// Set the invoice store; it also serves user lookups unless
    /// [`with_users`](Self::with_users) overrides them
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: InvoiceStore + UserStore + 'static,
    {
        let store = Arc::new(store);
        let invoices: Arc<dyn InvoiceStore> = store.clone();
        let users: Arc<dyn UserStore> = store;
        self.store = Some(invoices);
        self.users = Some(users);
        self
    }

    pub fn with_users(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    /// Replace the credentials authenticator
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Assemble the shared handler state
    pub fn build_state(self) -> Result<AppState> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("Invoice store is required. Call .with_store()"))?;

        let authenticator: Arc<dyn Authenticator> = match (self.authenticator, self.users) {
            (Some(authenticator), _) => authenticator,
            (None, Some(users)) => Arc::new(CredentialsAuthenticator::new(users)),
            (None, None) => return Err(anyhow!("User store is required for sign-in")),
        };

        let cache = Arc::new(ViewCache::new());
        let mut mutations = MutationService::new(store.clone(), cache.clone(), authenticator);
        if let Some(clock) = self.clock {
            mutations = mutations.with_clock(clock);
        }

        Ok(AppState {
            mutations,
            store,
            cache,
            items_per_page: self.config.items_per_page.max(1),
            backend: self.backend,
        })
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        Ok(build_router(self.build_state()?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
