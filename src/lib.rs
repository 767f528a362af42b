//! # TORO Orders
//!
//! Maintenance and repair work orders (ТОРО) for industrial equipment,
//! exposed as a small REST API.
//!
//! ## Features
//!
//! - **Validated Creation**: every violation in a payload is reported at once
//! - **Readable Numbers**: `TORO-YYYY-NNN`, restarting each year, unique under concurrent writers
//! - **Filtered Listing**: equality filters on priority, status and department
//! - **Pluggable Storage**: SQLite (default), PostgreSQL, or in-memory
//! - **Typed Errors**: each failure carries a stable machine-readable code
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toro::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     ServerBuilder::from_config(&config)
//!         .await?
//!         .serve(&config.bind_addr)
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Clock, FixedClock, NewOrder, Order, OrderDraft, OrderFilter, OrderListResponse,
        OrderNumber, OrderNumberGenerator, OrderService, OrderStore, Priority, SequenceCounter,
        Status, SystemClock, validate_order_payload,
    };

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, FieldViolation, OrderError, RequestError, StorageError, ToroError,
        ToroResult, ValidationError,
    };

    // === Storage ===
    pub use crate::storage::{Backend, InMemoryOrderStore, connect};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresOrderStore;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteOrderStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::Router;
}
