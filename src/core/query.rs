//! List filters and the list response envelope

use crate::core::error::{FieldViolation, ValidationError};
use crate::core::field;
use crate::core::order::{Order, Priority, Status};
use crate::core::validation::validators;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Query parameters accepted by the list operation
pub const FILTER_PARAMS: [&str; 3] = ["priority", "status", "department"];

/// Optional equality predicates, combined with AND
///
/// An empty filter matches every order.
///
/// # Example
/// ```rust,ignore
/// // GET /api/v1/orders?priority=high&department=Цех №1
/// let filter = OrderFilter::default()
///     .with_priority(Priority::High)
///     .with_department("Цех №1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub department: Option<String>,
}

impl OrderFilter {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Build a filter from raw query parameters, in request order.
    ///
    /// Values are trimmed. A parameter outside [`FILTER_PARAMS`], given
    /// twice, or holding a value outside its closed set is a violation.
    pub fn from_query(params: &[(String, String)]) -> Result<Self, ValidationError> {
        let mut filter = OrderFilter::default();
        let mut violations = Vec::new();
        let value = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, raw)| raw.trim().to_string())
        };

        if let Some(raw) = value("priority") {
            match raw.parse::<Priority>() {
                Ok(priority) => filter.priority = Some(priority),
                Err(e) => violations.push(FieldViolation::new(
                    "priority",
                    format!("must be one of: {}", e.allowed.join(", ")),
                )),
            }
        }

        if let Some(raw) = value("status") {
            match raw.parse::<Status>() {
                Ok(status) => filter.status = Some(status),
                Err(e) => violations.push(FieldViolation::new(
                    "status",
                    format!("must be one of: {}", e.allowed.join(", ")),
                )),
            }
        }

        if let Some(raw) = value("department") {
            let limit = field::max_chars("department").unwrap_or(usize::MAX);
            match validators::not_empty()(&raw).and_then(|()| validators::max_chars(limit)(&raw)) {
                Ok(()) => filter.department = Some(raw),
                Err(reason) => violations.push(FieldViolation::new("department", reason)),
            }
        }

        let mut seen = BTreeSet::new();
        let mut repeated = BTreeSet::new();
        let mut unknown = BTreeSet::new();
        for (key, _) in params {
            if !FILTER_PARAMS.contains(&key.as_str()) {
                unknown.insert(key.as_str());
            } else if !seen.insert(key.as_str()) {
                repeated.insert(key.as_str());
            }
        }
        for key in repeated {
            violations.push(FieldViolation::new(key, "must be given at most once"));
        }
        for key in unknown {
            violations.push(FieldViolation::new(key, "unknown filter"));
        }

        if violations.is_empty() {
            Ok(filter)
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Whether `order` satisfies every predicate
    pub fn matches(&self, order: &Order) -> bool {
        self.priority.is_none_or(|p| order.priority == p)
            && self.status.is_none_or(|s| order.status == s)
            && self
                .department
                .as_deref()
                .is_none_or(|d| order.department == d)
    }
}

/// Body of a list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    /// Always `orders.len()`; there is no pagination
    pub total: usize,
}

impl OrderListResponse {
    pub fn new(orders: Vec<Order>) -> Self {
        let total = orders.len();
        Self { orders, total }
    }
}
