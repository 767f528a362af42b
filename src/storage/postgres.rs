//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PostgresOrderStore`] backed by a PostgreSQL database via
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! toro-orders = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Differences from SQLite backend
//!
//! - `$1`, `$2` placeholders instead of `?`
//! - `BIGINT GENERATED ALWAYS AS IDENTITY` instead of `AUTOINCREMENT`
//! - `TIMESTAMPTZ` columns (microsecond precision)
//! - Schema creation is serialized with an advisory lock so several
//!   processes can start against the same database at once

use super::sql::{self, ORDER_COLUMNS, OrderRow};
use crate::core::error::{OrderError, StorageError, ToroResult};
use crate::core::order::{Order, OrderDraft};
use crate::core::order_number::{OrderNumberGenerator, SequenceCounter};
use crate::core::query::OrderFilter;
use crate::core::store::OrderStore;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

const BACKEND: &str = "postgres";

/// Arbitrary key for `pg_advisory_xact_lock` while creating the schema
const SCHEMA_LOCK_KEY: i64 = 0x746f_726f;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> ToroResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

    for statement in [
        "CREATE TABLE IF NOT EXISTS orders (
            id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
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
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS order_sequences (
            year INTEGER PRIMARY KEY,
            last_value BIGINT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_orders_priority ON orders (priority)",
        "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
        "CREATE INDEX IF NOT EXISTS idx_orders_department ON orders (department)",
    ] {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;
    }

    tx.commit()
        .await
        .map_err(|e| sql::map_sqlx_error(BACKEND, e))
}

/// The upsert row-locks the year's counter until the surrounding
/// transaction ends, which serializes concurrent inserts for that year.
#[async_trait]
impl SequenceCounter for PgConnection {
    async fn advance(&mut self, year: i32) -> ToroResult<u32> {
        let value: i64 = sqlx::query_scalar(
            "INSERT INTO order_sequences (year, last_value) VALUES ($1, 1)
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

/// Order store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Create a store over an existing pool. The schema is not touched.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and apply the schema.
    pub async fn connect(url: &str) -> ToroResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection {
                backend: BACKEND,
                message: e.to_string(),
            })?;

        ensure_schema(&pool).await?;
        tracing::debug!("postgres order store ready");
        Ok(Self::new(pool))
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
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
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
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
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| sql::map_insert_error(BACKEND, &order_number, e))?;

        tx.commit()
            .await
            .map_err(|e| sql::map_sqlx_error(BACKEND, e))?;

        Order::try_from(row)
    }

    async fn get(&self, id: i64) -> ToroResult<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
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
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE TRUE"
        ));
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
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
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
