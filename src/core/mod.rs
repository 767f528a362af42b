//! Core module containing the order model, its rules and the service contract

pub mod error;
pub mod field;
pub mod order;
pub mod order_number;
pub mod query;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{
    ConfigError, ErrorResponse, FieldViolation, OrderError, RequestError, StorageError,
    ToroError, ToroResult, ValidationError,
};
pub use field::FieldFormat;
pub use order::{NewOrder, Order, OrderDraft, Priority, Status, UnknownVariant};
pub use order_number::{OrderNumber, OrderNumberError, OrderNumberGenerator, SequenceCounter};
pub use query::{OrderFilter, OrderListResponse};
pub use service::{Clock, FixedClock, OrderService, SystemClock};
pub use store::OrderStore;
pub use validation::validate_order_payload;
