//! Row mapping and error translation shared by the SQL backends

use crate::core::error::{OrderError, StorageError, ToroError};
use crate::core::order::{Order, Priority, Status};
use crate::core::order_number::OrderNumber;
use chrono::{DateTime, Utc};

/// Column list used by every `SELECT` and `RETURNING` clause
pub(crate) const ORDER_COLUMNS: &str = "id, order_number, equipment_type, equipment_id, \
     issue_description, priority, status, requester_name, department, contact_phone, \
     contact_email, created_at, updated_at";

/// One `orders` row as the database returns it
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: i64,
    order_number: String,
    equipment_type: String,
    equipment_id: String,
    issue_description: String,
    priority: String,
    status: String,
    requester_name: String,
    department: String,
    contact_phone: String,
    contact_email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = ToroError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let integrity = |e: &dyn std::fmt::Display| StorageError::Integrity {
            message: format!("order {}: {}", row.id, e),
        };

        let order_number: OrderNumber = row.order_number.parse().map_err(|e| integrity(&e))?;
        let priority = row.priority.parse::<Priority>().map_err(|e| integrity(&e))?;
        let status = row.status.parse::<Status>().map_err(|e| integrity(&e))?;

        Ok(Order {
            id: row.id,
            order_number,
            equipment_type: row.equipment_type,
            equipment_id: row.equipment_id,
            issue_description: row.issue_description,
            priority,
            status,
            requester_name: row.requester_name,
            department: row.department,
            contact_phone: row.contact_phone,
            contact_email: row.contact_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Whether a database error signals lock contention worth retrying
fn is_contention(backend: &'static str, err: &dyn sqlx::error::DatabaseError) -> bool {
    let Some(code) = err.code() else {
        return false;
    };
    match backend {
        // SQLITE_BUSY and SQLITE_LOCKED, including their extended codes
        "sqlite" => code.parse::<i32>().is_ok_and(|c| matches!(c & 0xff, 5 | 6)),
        // serialization_failure, deadlock_detected
        "postgres" => code == "40001" || code == "40P01",
        _ => false,
    }
}

/// Translate an sqlx error into the storage taxonomy
pub(crate) fn map_sqlx_error(backend: &'static str, err: sqlx::Error) -> ToroError {
    let storage = match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StorageError::Unavailable { backend },
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StorageError::Connection {
            backend,
            message: err.to_string(),
        },
        sqlx::Error::Database(db) if is_contention(backend, &**db) => StorageError::Busy {
            backend,
            message: db.message().to_string(),
        },
        _ => StorageError::Query {
            backend,
            message: err.to_string(),
        },
    };
    storage.into()
}

/// Like [`map_sqlx_error`], but a unique violation becomes a number conflict
pub(crate) fn map_insert_error(
    backend: &'static str,
    order_number: &OrderNumber,
    err: sqlx::Error,
) -> ToroError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        OrderError::NumberConflict {
            order_number: order_number.to_string(),
        }
        .into()
    } else {
        map_sqlx_error(backend, err)
    }
}

pub(crate) fn invalid_sequence(backend: &'static str, value: i64) -> ToroError {
    StorageError::Integrity {
        message: format!("{backend} order sequence returned {value}"),
    }
    .into()
}
