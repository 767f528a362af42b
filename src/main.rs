//! `toro-server`: serves the work order API
//!
//! Configuration comes from `TORO_CONFIG` (YAML file) and `TORO_*`
//! environment variables; `RUST_LOG` overrides the configured log level.

use anyhow::Result;
use toro::config::AppConfig;
use toro::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        backend = %config.backend()?,
        bind_addr = %config.bind_addr,
        max_create_attempts = config.max_create_attempts,
        "starting toro-orders"
    );

    ServerBuilder::from_config(&config)
        .await?
        .serve(&config.bind_addr)
        .await
}
