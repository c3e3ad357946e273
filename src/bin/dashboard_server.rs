//! Dashboard HTTP server
//!
//! Usage: `dashboard-server [config.yaml]`. Without a config file the server
//! binds to `127.0.0.1:3000` and serves seeded in-memory data.

use anyhow::Result;
use dashboard::config::DashboardConfig;
use dashboard::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "loading configuration");
            DashboardConfig::from_yaml_file(&path)?
        }
        None => DashboardConfig::default(),
    };

    ServerBuilder::from_config(config).await?.serve().await
}
