//! The work order model and its closed value sets

use crate::core::order_number::OrderNumber;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string is not a member of one of the closed value sets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind} (expected one of: {})", .allowed.join(", "))]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

/// Urgency of a work order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const NAMES: &'static [&'static str] = &["low", "medium", "high"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    /// Case-sensitive: `"High"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(UnknownVariant {
                kind: "priority",
                value: other.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Lifecycle state of a work order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Created,
    InProgress,
    Completed,
}

impl Status {
    pub const NAMES: &'static [&'static str] = &["created", "in_progress", "completed"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "created",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Status::Created),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(UnknownVariant {
                kind: "status",
                value: other.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Client-supplied content of an order, trimmed and validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub equipment_type: String,
    pub equipment_id: String,
    pub issue_description: String,
    pub priority: Priority,
    pub requester_name: String,
    pub department: String,
    pub contact_phone: String,
    pub contact_email: String,
}

/// Everything a store needs to persist an order except the identifiers
/// it assigns itself (`id` and `order_number`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub content: NewOrder,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// A fresh draft in the `created` state
    pub fn new(content: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            content,
            status: Status::Created,
            created_at,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Year the order number is drawn from
    pub fn year(&self) -> i32 {
        self.created_at.year()
    }

    /// Materialize the draft once the store has assigned its identifiers.
    /// `updated_at` starts equal to `created_at`.
    pub fn into_order(self, id: i64, order_number: OrderNumber) -> Order {
        let NewOrder {
            equipment_type,
            equipment_id,
            issue_description,
            priority,
            requester_name,
            department,
            contact_phone,
            contact_email,
        } = self.content;

        Order {
            id,
            order_number,
            equipment_type,
            equipment_id,
            issue_description,
            priority,
            status: self.status,
            requester_name,
            department,
            contact_phone,
            contact_email,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A persisted work order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub equipment_type: String,
    pub equipment_id: String,
    pub issue_description: String,
    pub priority: Priority,
    pub status: Status,
    pub requester_name: String,
    pub department: String,
    pub contact_phone: String,
    pub contact_email: String,
    #[serde(with = "rfc3339_micros")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_micros")]
    pub updated_at: DateTime<Utc>,
}

/// Timestamps go over the wire as `2025-03-01T10:15:30.123456Z`.
mod rfc3339_micros {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
