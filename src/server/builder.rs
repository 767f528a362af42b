//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use crate::config::AppConfig;
use crate::core::service::{Clock, OrderService};
use crate::core::store::OrderStore;
use crate::storage;
use anyhow::{Context, Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the order HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryOrderStore::new())
///     .with_max_create_attempts(3)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn OrderStore>>,
    clock: Option<Arc<dyn Clock>>,
    max_create_attempts: u32,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            clock: None,
            max_create_attempts: OrderService::DEFAULT_MAX_CREATE_ATTEMPTS,
            custom_routes: Vec::new(),
        }
    }

    /// Connect the store named by `config.database_url` and apply the
    /// remaining settings.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = config.backend()?;
        let store = storage::connect(&config.database_url)
            .await
            .with_context(|| format!("failed to open the {backend} order store"))?;

        Ok(Self::new()
            .with_shared_store(store)
            .with_max_create_attempts(config.max_create_attempts))
    }

    /// Set the order store
    pub fn with_store(self, store: impl OrderStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set an already shared order store
    pub fn with_shared_store(mut self, store: Arc<dyn OrderStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the wall clock (tests pin the year this way)
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_max_create_attempts(mut self, attempts: u32) -> Self {
        self.max_create_attempts = attempts;
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the order service without the HTTP layer
    pub fn build_service(&self) -> Result<OrderService> {
        let store = self
            .store
            .clone()
            .ok_or_else(|| anyhow!("An order store is required"))?;

        let mut service =
            OrderService::new(store).with_max_create_attempts(self.max_create_attempts);
        if let Some(clock) = &self.clock {
            service = service.with_clock(clock.clone());
        }
        Ok(service)
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        let service = self.build_service()?;
        Ok(build_router(service, self.custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_store(store)
    ///     .serve("127.0.0.1:5000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

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

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
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
