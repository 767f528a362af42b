//! Persistence contract for orders

use crate::core::error::ToroResult;
use crate::core::order::{Order, OrderDraft};
use crate::core::query::OrderFilter;
use async_trait::async_trait;

/// Durable mapping from `id` to [`Order`]
///
/// Implementations assign `id` and `order_number` on insert. Numbering and
/// the insert must happen atomically: two concurrent inserts never receive
/// the same number, and a number is never handed out again after its order
/// is deleted.
///
/// Errors keep their kind: a missing id is `OrderError::NotFound`, a
/// duplicate number is `OrderError::NumberConflict`, lock contention is
/// `StorageError::Busy`.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Number and persist a draft, returning the stored row
    async fn insert(&self, draft: OrderDraft) -> ToroResult<Order>;

    /// Fetch one order
    async fn get(&self, id: i64) -> ToroResult<Order>;

    /// Orders matching every predicate of `filter`, by `id` ascending
    async fn list(&self, filter: &OrderFilter) -> ToroResult<Vec<Order>>;

    /// Remove one order
    async fn delete(&self, id: i64) -> ToroResult<()>;

    /// Number of stored orders
    async fn count(&self) -> ToroResult<u64>;
}
