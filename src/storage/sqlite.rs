//! SQLite storage backend using sqlx.
//!
//! Provides [`SqliteOrderStore`], the default durable backend. A database
//! file named by the connection URL is created on first use.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag (on by default):
//! ```toml
//! [dependencies]
//! toro-orders = { version = "0.1", features = ["sqlite"] }
//! ```
//!
//! # Schema
//!
//! - `orders`: one row per order, `order_number` is `UNIQUE`
//! - `order_sequences`: the last issued sequence per year
//!
//! # Concurrency
//!
//! The counter upsert is the first statement of the insert transaction, so
//! the transaction takes the write lock immediately instead of upgrading a
//! read lock later. Writers queue on `busy_timeout`; when that runs out the
//! error surfaces as `StorageError::Busy` and the service retries.

use super::sql::{self, ORDER_COLUMNS, OrderRow};
use crate::core::error::{ConfigError, OrderError, StorageError, ToroResult};
use crate::core::order::{Order, OrderDraft};
use crate::core::order_number::{OrderNumberGenerator, SequenceCounter};
use crate::core::query::OrderFilter;
use crate::core::store::OrderStore;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

const BACKEND: &str = "sqlite";

/// How long a writer waits for the lock before reporting `Busy`
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> ToroResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_number TEXT NOT NULL UNIQUE,
            equipment_type TEXT NOT NULL,
            equipment_id TEXT NOT NULL,
            issue_description TEXT NOT NULL,
            priority TEXT NOT NULL CHECK (priority IN ('low', 'medium', 'high')),
            status TEXT NOT NULL CHECK (status IN ('created', 'in_progress', 'completed')),
            requester_name TEXT NOT NULL,
            department TEXT NOT NULL,
            contact_phone TEXT NOT NULL,
            contact_email TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS order_sequences (
            year INTEGER PRIMARY KEY,
            last_value INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_orders_priority ON orders (priority)",
        "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
        "CREATE INDEX IF NOT EXISTS idx_orders_department ON orders (department)",
    ] {
        sqlx::query(index)
            .execute(pool)
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;
    }

    Ok(())
}

/// The counter row lives in the same database, so advancing it on the
/// insert transaction's connection makes numbering part of the insert.
#[async_trait]
impl SequenceCounter for SqliteConnection {
    async fn advance(&mut self, year: i32) -> ToroResult<u32> {
        let value: i64 = sqlx::query_scalar(
            "INSERT INTO order_sequences (year, last_value) VALUES (?, 1)
             ON CONFLICT (year) DO UPDATE SET last_value = order_sequences.last_value + 1
             RETURNING last_value",
        )
        .bind(year)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        u32::try_from(value).map_err(|_| sql::invalid_sequence(BACKEND, value))
    }
}

/// Order store backed by SQLite
#[derive(Clone, Debug)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Create a store over an existing pool. The schema is not touched.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database behind `url` and apply the schema.
    ///
    /// In-memory URLs get a single long-lived connection, since every
    /// SQLite connection to `:memory:` is a separate database.
    pub async fn connect(url: &str) -> ToroResult<Self> {
        if !url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidValue {
                field: "database_url".to_string(),
                value: url.to_string(),
                message: "expected a sqlite: URL".to_string(),
            }
            .into());
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| ConfigError::InvalidValue {
                field: "database_url".to_string(),
                value: url.to_string(),
                message: e.to_string(),
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                backend: BACKEND,
                message: e.to_string(),
            })?;

        ensure_schema(&pool).await?;
        tracing::debug!(in_memory, "sqlite order store ready");
        Ok(Self::new(pool))
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn insert(&self, draft: OrderDraft) -> ToroResult<Order> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        let order_number = OrderNumberGenerator::next(&mut *tx, draft.year()).await?;

        let sql = format!(
            "INSERT INTO orders (order_number, equipment_type, equipment_id, issue_description,
                priority, status, requester_name, department, contact_phone, contact_email,
                created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {ORDER_COLUMNS}"
        );
        let content = &draft.content;
        let row: OrderRow = sqlx::query_as(&sql)
            .bind(order_number.to_string())
            .bind(&content.equipment_type)
            .bind(&content.equipment_id)
            .bind(&content.issue_description)
            .bind(content.priority.as_str())
            .bind(draft.status.as_str())
            .bind(&content.requester_name)
            .bind(&content.department)
            .bind(&content.contact_phone)
            .bind(&content.contact_email)
            .bind(draft.created_at)
            .bind(draft.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| sql::map_insert_error(BACKEND, &order_number, e))?;

        tx.commit()
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        Order::try_from(row)
    }

    async fn get(&self, id: i64) -> ToroResult<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        match row {
            Some(row) => Order::try_from(row),
            None => Err(OrderError::NotFound { id }.into()),
        }
    }

    async fn list(&self, filter: &OrderFilter) -> ToroResult<Vec<Order>> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1"));
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(department) = &filter.department {
            query.push(" AND department = ").push_bind(department.clone());
        }
        query.push(" ORDER BY id ASC");

        let rows: Vec<OrderRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn delete(&self, id: i64) -> ToroResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound { id }.into());
        }
        Ok(())
    }

    async fn count(&self) -> ToroResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;
        Ok(count.max(0) as u64)
    }
}
