//! Typed error handling for the order service
//!
//! Every failure the service can produce is a [`ToroError`]. Each category
//! keeps its own enum so callers can match on the kind they care about
//! instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: client data violates the payload or filter rules
//! - [`OrderError`]: the referenced order is missing, or its number collided
//! - [`StorageError`]: the backing store failed
//! - [`RequestError`]: the HTTP request could not be decoded
//! - [`ConfigError`]: the process configuration is unusable
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get(42).await {
//!     Ok(order) => println!("{}", order.order_number),
//!     Err(ToroError::Order(OrderError::NotFound { id })) => println!("no order {id}"),
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the order service
#[derive(Debug, Error)]
pub enum ToroError {
    /// Client-supplied data violates the validation rules
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Order lookup and numbering errors
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ToroError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ToroError::Validation(_) => StatusCode::BAD_REQUEST,
            ToroError::Order(e) => e.status_code(),
            ToroError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ToroError::Request(_) => StatusCode::BAD_REQUEST,
            ToroError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ToroError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ToroError::Validation(_) => "VALIDATION_FAILED",
            ToroError::Order(e) => e.error_code(),
            ToroError::Storage(e) => e.error_code(),
            ToroError::Request(e) => e.error_code(),
            ToroError::Config(_) => "CONFIG_ERROR",
            ToroError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same operation may succeed without any change
    /// on the caller's side.
    pub fn is_transient(&self) -> bool {
        matches!(self, ToroError::Storage(StorageError::Busy { .. }))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ToroError::Validation(e) => Some(serde_json::json!({ "fields": e.violations })),
            ToroError::Order(OrderError::NotFound { id }) => Some(serde_json::json!({ "id": id })),
            ToroError::Order(OrderError::NumberConflict { order_number }) => {
                Some(serde_json::json!({ "order_number": order_number }))
            }
            ToroError::Order(OrderError::AllocationExhausted { attempts }) => {
                Some(serde_json::json!({ "attempts": attempts }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ToroError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single `(field, reason)` violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// All violations found in one payload or query, in rule order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Shorthand for a single-violation error
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field, reason)])
    }

    /// Whether any violation concerns `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

// =============================================================================
// Order Errors
// =============================================================================

/// Errors tied to a specific order or order number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// No order carries this id
    #[error("Order with id '{id}' not found")]
    NotFound { id: i64 },

    /// The order number is already taken by another row
    #[error("Order number '{order_number}' is already taken")]
    NumberConflict { order_number: String },

    /// Number allocation kept losing to concurrent writers
    #[error("Could not allocate an order number after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::NumberConflict { .. } => StatusCode::CONFLICT,
            OrderError::AllocationExhausted { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::NumberConflict { .. } => "ORDER_NUMBER_CONFLICT",
            OrderError::AllocationExhausted { .. } => "ORDER_NUMBER_CONFLICT",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Could not open a connection
    #[error("Failed to connect to {backend}: {message}")]
    Connection {
        backend: &'static str,
        message: String,
    },

    /// Query execution error
    #[error("{backend} query error: {message}")]
    Query {
        backend: &'static str,
        message: String,
    },

    /// Another writer holds the lock; the statement can be retried
    #[error("{backend} is busy: {message}")]
    Busy {
        backend: &'static str,
        message: String,
    },

    /// A stored row no longer satisfies the model invariants
    #[error("Data integrity error: {message}")]
    Integrity { message: String },

    /// Pool closed or exhausted
    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: &'static str },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Connection { .. }
            | StorageError::Busy { .. }
            | StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
            StorageError::Query { .. } | StorageError::Integrity { .. } => "STORAGE_ERROR",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to decoding HTTP requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Body missing, not JSON, or wrong content type
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Query string could not be decoded
    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },

    /// Path id is not an integer
    #[error("Invalid order id: '{value}'")]
    InvalidId { value: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
            RequestError::InvalidId { .. } => "INVALID_ID",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration file
    #[error("Failed to parse config{}: {message}", file.as_ref().map(|f| format!(" file '{f}'")).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value for a setting
    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error reading '{path}': {message}")]
    IoError { path: String, message: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ToroError {
    fn from(err: serde_json::Error) -> Self {
        ToroError::Request(RequestError::InvalidBody {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for order operations
pub type ToroResult<T> = Result<T, ToroError>;
